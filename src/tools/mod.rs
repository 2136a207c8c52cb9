pub mod log;
pub mod http_tools;
pub mod serialization_tools;

#[cfg(test)]
pub mod test_server;
