#![cfg_attr(debug_assertions, allow(dead_code, unused_imports))]

use clap::Parser;

use config::Args;
use tools::log::{log_info, LogServiceType};
pub use self::error::{Result, Error};

mod api;
mod commands;
mod config;
mod domain;
mod error;
mod routes;
mod tools;


#[tokio::main]
async fn main() -> Result<()> {
    tools::log::init_tracing();
    let args = Args::parse();
    let config = config::get_config_with_overrides(&args).await?;
    log_info(LogServiceType::Config, format!("Movies api: {} ({}), authority: {}", config.api_url, config.movies_path, config.authority));

    commands::run(args, config).await
}
