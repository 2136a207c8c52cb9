use std::sync::Arc;

use async_trait::async_trait;
use http::{header::ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, Url};

use crate::{tools::{http_tools::{join_url, parse_url}, log::{log_debug, LogServiceType}}, Error, Result};

/// Where the interceptor gets the bearer token for the current user.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// `None` means the request goes out unauthenticated.
    async fn access_token(&self) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.0.clone().filter(|t| !t.is_empty()))
    }
}

/// A reqwest client sending `Accept: application/json` on every request, next to the `Accept-Encoding` reqwest adds for gzip.
pub fn json_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(Client::builder().default_headers(headers).build()?)
}

/// Any non 2xx status becomes [`Error::Status`], carrying the request method and final url.
pub fn ensure_success(method: &Method, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        log_debug(LogServiceType::Api, format!("{} {} returned {}", method, response.url(), status));
        Err(Error::Status { method: method.to_string(), url: response.url().to_string(), status: status.as_u16() })
    }
}

/// HTTP client bound to a base address. Every request built through it carries the current bearer token.
#[derive(Clone)]
pub struct AuthenticatedClient {
    base_url: Url,
    client: Client,
    tokens: Arc<dyn AccessTokenSource>,
}

impl AuthenticatedClient {
    pub fn new(base_url: &str, tokens: Arc<dyn AccessTokenSource>) -> Result<Self> {
        Ok(AuthenticatedClient {
            base_url: parse_url(base_url)?,
            client: json_client()?,
            tokens,
        })
    }

    pub fn tokens(&self) -> Arc<dyn AccessTokenSource> {
        self.tokens.clone()
    }

    pub async fn add_auth(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match self.tokens.access_token().await? {
            Some(token) => Ok(request.bearer_auth(token)),
            None => {
                log_debug(LogServiceType::Api, "No access token in session, sending unauthenticated request".to_string());
                Ok(request)
            }
        }
    }

    pub async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = join_url(&self.base_url, path)?;
        log_debug(LogServiceType::Api, format!("{} {}", method, url));
        let builder = self.client.request(method, url);
        self.add_auth(builder).await
    }

    /// Sends and asserts a success status.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        let method = request.method().clone();
        let response = self.client.execute(request).await?;
        ensure_success(&method, response)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token() {
        assert_eq!(StaticToken(Some("abc".to_string())).access_token().await.unwrap().as_deref(), Some("abc"));
        assert_eq!(StaticToken(Some(String::new())).access_token().await.unwrap(), None);
        assert_eq!(StaticToken(None).access_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn requests_carry_bearer() {
        let client = AuthenticatedClient::new("https://localhost:5001/", Arc::new(StaticToken(Some("abc".to_string())))).unwrap();
        let request = client.request(Method::GET, "/movies").await.unwrap().build().unwrap();
        assert_eq!(request.url().as_str(), "https://localhost:5001/movies");
        assert_eq!(request.headers().get(http::header::AUTHORIZATION).unwrap(), "Bearer abc");

        let anonymous = AuthenticatedClient::new("https://localhost:5001/", Arc::new(StaticToken(None))).unwrap();
        let request = anonymous.request(Method::DELETE, "/movies/2").await.unwrap().build().unwrap();
        assert_eq!(request.method(), &Method::DELETE);
        assert!(request.headers().get(http::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn invalid_base_url() {
        let result = AuthenticatedClient::new("localhost", Arc::new(StaticToken(None)));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
