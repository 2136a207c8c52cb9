use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "movies_client=info";

pub enum LogServiceType {
    Api,
    Idp,
    Session,
    Config,
    Other
}
impl LogServiceType {
    fn as_str(&self) -> &'static str {
        match self {
            LogServiceType::Api => "API",
            LogServiceType::Idp => "IDP",
            LogServiceType::Session => "SESSION",
            LogServiceType::Config => "CONFIG",
            LogServiceType::Other => "OTHER"
        }
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn log_debug(service: LogServiceType, message: String) {
    tracing::debug!(service = service.as_str(), "{}", message)
}

pub fn log_info(service: LogServiceType, message: String) {
    tracing::info!(service = service.as_str(), "{}", message)
}

pub fn log_error(service: LogServiceType, message: String) {
    tracing::error!(service = service.as_str(), "{}", message)
}
