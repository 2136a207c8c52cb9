use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::{api::{AccessTokenSource, ClientCredentialsSource, IdpContext, MovieApi, MovieApiContext, StaticToken}, config::{Args, ClientConfig, Command}, tools::log::{log_info, LogServiceType}, Result};


pub fn token_source(args: &Args, config: &ClientConfig) -> Result<Arc<dyn AccessTokenSource>> {
    if args.token.is_some() || !args.client_credentials {
        return Ok(Arc::new(StaticToken(args.token.clone())));
    }
    log_info(LogServiceType::Api, "Using client credentials grant for api token".to_string());
    let idp = IdpContext::from_config(config)?;
    Ok(Arc::new(ClientCredentialsSource::new(idp, config.api_credentials())))
}

/// Runs one command and returns the json printed on stdout.
pub async fn execute(command: Command, api: &MovieApiContext, config: &ClientConfig) -> Result<String> {
    let output = match command {
        Command::List => to_json(&api.get_movies().await?)?,
        Command::Get { id } => to_json(&api.get_movie(id).await?)?,
        Command::Create(movie) => {
            let movie = movie.into_movie(0);
            api.create_movie(&movie).await?;
            to_json(&json!({ "created": movie }))?
        },
        Command::Update { id, movie } => {
            let movie = movie.into_movie(id);
            api.update_movie(&movie).await?;
            to_json(&json!({ "updated": movie }))?
        },
        Command::Delete { id } => {
            api.delete_movie(id).await?;
            to_json(&json!({ "deleted": id }))?
        },
        Command::Userinfo => to_json(&api.get_user_info().await?.claims())?,
        Command::Token => to_json(&api.idp().request_client_credentials_token(&config.api_credentials()).await?)?,
        Command::Discovery => to_json(&api.idp().discover().await?)?,
    };
    Ok(output)
}

pub async fn run(args: Args, config: ClientConfig) -> Result<()> {
    let tokens = token_source(&args, &config)?;
    let api = MovieApiContext::new(&config, tokens)?;
    let output = execute(args.command, &api, &config).await?;
    println!("{}", output);
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
