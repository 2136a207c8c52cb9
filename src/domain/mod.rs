pub mod movie;
pub mod user_info;
pub mod token;
pub mod discovery;
