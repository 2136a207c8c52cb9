use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use crate::{config::ClientConfig, domain::{movie::Movie, user_info::UserInfo}, routes::mw_session::UserSession, tools::{http_tools::resource_path, log::{log_debug, log_info, LogServiceType}}, Error, Result};

use super::{client::{AccessTokenSource, AuthenticatedClient}, idp::IdpContext};

#[async_trait]
pub trait MovieApi: Send + Sync {
    async fn get_movies(&self) -> Result<Vec<Movie>>;
    async fn get_movie(&self, id: i32) -> Result<Movie>;
    async fn create_movie(&self, movie: &Movie) -> Result<()>;
    async fn update_movie(&self, movie: &Movie) -> Result<()>;
    async fn delete_movie(&self, id: i32) -> Result<()>;
    async fn get_user_info(&self) -> Result<UserInfo>;
}

#[derive(Clone)]
pub struct MovieApiContext {
    api: AuthenticatedClient,
    idp: IdpContext,
    movies_path: String,
}

impl MovieApiContext {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn AccessTokenSource>) -> Result<Self> {
        Ok(MovieApiContext {
            api: AuthenticatedClient::new(&config.api_url, tokens)?,
            idp: IdpContext::from_config(config)?,
            movies_path: config.movies_path.clone(),
        })
    }

    pub fn for_session(config: &ClientConfig, session: UserSession) -> Result<Self> {
        Self::new(config, Arc::new(session))
    }

    pub fn idp(&self) -> &IdpContext {
        &self.idp
    }

    fn movie_path(&self, id: i32) -> String {
        resource_path(&self.movies_path, id)
    }
}

#[async_trait]
impl MovieApi for MovieApiContext {
    async fn get_movies(&self) -> Result<Vec<Movie>> {
        let request = self.api.request(Method::GET, &self.movies_path).await?;
        let response = self.api.send(request).await?;
        let movies = response.json::<Vec<Movie>>().await?;
        Ok(movies)
    }

    async fn get_movie(&self, id: i32) -> Result<Movie> {
        let request = self.api.request(Method::GET, &self.movie_path(id)).await?;
        let response = self.api.send(request).await?;
        let movie = response.json::<Movie>().await?;
        Ok(movie)
    }

    async fn create_movie(&self, movie: &Movie) -> Result<()> {
        let request = self.api.request(Method::POST, &self.movies_path).await?.json(movie);
        self.api.send(request).await?;
        log_info(LogServiceType::Api, format!("Created movie {}", movie.title));
        Ok(())
    }

    async fn update_movie(&self, movie: &Movie) -> Result<()> {
        let request = self.api.request(Method::PUT, &self.movie_path(movie.id)).await?.json(movie);
        self.api.send(request).await?;
        log_info(LogServiceType::Api, format!("Updated movie {}", movie.id));
        Ok(())
    }

    async fn delete_movie(&self, id: i32) -> Result<()> {
        let request = self.api.request(Method::DELETE, &self.movie_path(id)).await?;
        self.api.send(request).await?;
        log_info(LogServiceType::Api, format!("Deleted movie {}", id));
        Ok(())
    }

    async fn get_user_info(&self) -> Result<UserInfo> {
        let document = self.idp.discover().await?;
        let endpoint = document.userinfo_endpoint.ok_or_else(|| Error::Discovery { reason: "No userinfo endpoint in discovery document".to_string() })?;
        let token = self.api.tokens().access_token().await?;
        let info = self.idp.user_info(&endpoint, token.as_deref()).await?;
        if info.is_empty() {
            log_debug(LogServiceType::Idp, format!("No claims returned by {}", endpoint));
        }
        Ok(info)
    }
}
