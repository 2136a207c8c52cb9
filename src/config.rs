use std::{env, path::{Path, PathBuf}};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tokio::fs::{create_dir_all, read_to_string};

use crate::{domain::{movie::Movie, token::{ClientCredentials, OidcClient}}, tools::{log::{log_info, LogServiceType}, serialization_tools::parse_flexible_date}, Error, Result};


const ENV_API_URL: &str = "MOVIES_API_URL";
const ENV_PATH: &str = "MOVIES_PATH";
const ENV_AUTHORITY: &str = "MOVIES_AUTHORITY";
const ENV_CLIENT_ID: &str = "MOVIES_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "MOVIES_CLIENT_SECRET";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_movies_path")]
    pub movies_path: String,
    #[serde(default = "default_authority")]
    pub authority: String,

    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_secret")]
    pub client_secret: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    #[serde(default = "default_api_client_id")]
    pub api_client_id: String,
    #[serde(default = "default_secret")]
    pub api_client_secret: String,
    #[serde(default = "default_api_scope")]
    pub api_scope: String,

    #[serde(default = "default_true")]
    pub validate_issuer: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: default_api_url(),
            movies_path: default_movies_path(),
            authority: default_authority(),
            client_id: default_client_id(),
            client_secret: default_secret(),
            scopes: default_scopes(),
            api_client_id: default_api_client_id(),
            api_client_secret: default_secret(),
            api_scope: default_api_scope(),
            validate_issuer: true,
        }
    }
}

impl ClientConfig {
    pub fn api_credentials(&self) -> ClientCredentials {
        ClientCredentials {
            client_id: self.api_client_id.clone(),
            client_secret: self.api_client_secret.clone(),
            scope: self.api_scope.clone(),
        }
    }

    pub fn oidc_client(&self) -> OidcClient {
        OidcClient {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes: self.scopes.clone(),
        }
    }
}

fn default_api_url() -> String {
    "https://localhost:5001/".to_owned()
}
fn default_movies_path() -> String {
    "/movies".to_owned()
}
fn default_authority() -> String {
    "https://localhost:5005".to_owned()
}
fn default_client_id() -> String {
    "movies_mvc_client".to_owned()
}
fn default_secret() -> String {
    "secret".to_owned()
}
fn default_scopes() -> Vec<String> {
    vec!["openid".to_owned(), "profile".to_owned()]
}
fn default_api_client_id() -> String {
    "movieClient".to_owned()
}
fn default_api_scope() -> String {
    "movieAPI".to_owned()
}
fn default_true() -> bool {
    true
}


#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path of the json config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub api_url: Option<String>,

    #[arg(long)]
    pub movies_path: Option<String>,

    #[arg(long)]
    pub authority: Option<String>,

    #[arg(long)]
    pub client_id: Option<String>,

    #[arg(long)]
    pub client_secret: Option<String>,

    /// Access token saved at login
    #[arg(short, long, env = "MOVIES_ACCESS_TOKEN")]
    pub token: Option<String>,

    /// Request an api token with the client credentials grant instead of using a session token
    #[arg(short = 'k', long)]
    pub client_credentials: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List all movies
    List,
    Get { id: i32 },
    Create(MovieArgs),
    Update {
        id: i32,
        #[command(flatten)]
        movie: MovieArgs,
    },
    Delete { id: i32 },
    /// Claims of the signed-in user from the identity provider
    Userinfo,
    /// Request a client credentials token for the movies api
    Token,
    Discovery,
}

#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct MovieArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub genre: String,
    #[arg(long, default_value = "")]
    pub rating: String,
    #[arg(long, default_value = "")]
    pub image_url: String,
    #[arg(long, value_parser = parse_release_date)]
    pub release_date: DateTime<Utc>,
    #[arg(long, default_value = "")]
    pub owner: String,
}

impl MovieArgs {
    pub fn into_movie(self, id: i32) -> Movie {
        Movie {
            id,
            title: self.title,
            genre: self.genre,
            rating: self.rating,
            image_url: self.image_url,
            release_date: self.release_date,
            owner: self.owner,
        }
    }
}

fn parse_release_date(raw: &str) -> core::result::Result<DateTime<Utc>, String> {
    parse_flexible_date(raw).ok_or_else(|| format!("invalid date: {}", raw))
}


pub fn get_config_local_path(args: &Args) -> Result<PathBuf> {
    if let Some(path) = &args.config {
        return Ok(path.clone());
    }
    let Some(mut dir_path) = dirs::config_local_dir() else { return Err(Error::ConfigUnableToAccessFolder); };
    dir_path.push("movies-client");
    dir_path.push("config.json");
    Ok(dir_path)
}

/// A missing file yields the defaults.
pub async fn get_raw_config(path: &Path) -> Result<ClientConfig> {
    match read_to_string(path).await {
        Ok(data) => serde_json::from_str::<ClientConfig>(&data).map_err(|e| Error::ConfigMalformed(format!("{:?}: {}", path, e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(e) => Err(e.into()),
    }
}

pub async fn write_config(path: &Path, config: &ClientConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).await.map_err(|_| Error::ConfigUnableToAccessFolder)?;
    }
    let data = serde_json::to_string_pretty(config)?;
    tokio::fs::write(path, data).await?;
    Ok(())
}

pub fn apply_env_overrides(config: &mut ClientConfig) {
    if let Ok(val) = env::var(ENV_API_URL) {
        config.api_url = val;
    }
    if let Ok(val) = env::var(ENV_PATH) {
        config.movies_path = val;
    }
    if let Ok(val) = env::var(ENV_AUTHORITY) {
        config.authority = val;
    }
    if let Ok(val) = env::var(ENV_CLIENT_ID) {
        config.client_id = val;
    }
    if let Ok(val) = env::var(ENV_CLIENT_SECRET) {
        config.client_secret = val;
    }
}

pub fn apply_args_overrides(config: &mut ClientConfig, args: &Args) {
    if let Some(val) = &args.api_url {
        config.api_url = val.clone();
    }
    if let Some(val) = &args.movies_path {
        config.movies_path = val.clone();
    }
    if let Some(val) = &args.authority {
        config.authority = val.clone();
    }
    if let Some(val) = &args.client_id {
        config.client_id = val.clone();
    }
    if let Some(val) = &args.client_secret {
        config.client_secret = val.clone();
    }
}

/// defaults < config file < environment < command line
pub async fn get_config_with_overrides(args: &Args) -> Result<ClientConfig> {
    let path = get_config_local_path(args)?;
    log_info(LogServiceType::Config, format!("Config path: {:?}", path));
    let mut config = get_raw_config(&path).await?;
    apply_env_overrides(&mut config);
    apply_args_overrides(&mut config, args);
    Ok(config)
}
