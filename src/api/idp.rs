use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::Value;

use crate::{config::ClientConfig, domain::{discovery::DiscoveryDocument, token::{ClientCredentials, OidcClient, TokenErrorResponse, TokenResponse}, user_info::UserInfo}, tools::{http_tools::{parse_url, same_origin}, log::{log_debug, log_error, log_info, LogServiceType}}, Error, Result};

use super::client::{ensure_success, json_client, AccessTokenSource};

const DISCOVERY_PATH: &str = ".well-known/openid-configuration";

/// Talks to the identity provider: discovery document, token endpoint and userinfo endpoint.
#[derive(Debug, Clone)]
pub struct IdpContext {
    authority: String,
    authority_url: Url,
    client: Client,
    validate_issuer: bool,
}

impl IdpContext {
    pub fn new(authority: &str, validate_issuer: bool) -> Result<Self> {
        let authority = authority.trim_end_matches('/').to_string();
        Ok(IdpContext {
            authority_url: parse_url(&authority)?,
            authority,
            client: json_client()?,
            validate_issuer,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.authority, config.validate_issuer)
    }
}

// Discovery
impl IdpContext {
    pub async fn discover(&self) -> Result<DiscoveryDocument> {
        self.fetch_discovery().await.map_err(|err| {
            log_error(LogServiceType::Idp, format!("Discovery failed for {}: {:?}", self.authority, err));
            match err {
                Error::Discovery { .. } => err,
                other => Error::Discovery { reason: format!("{:?}", other) },
            }
        })
    }

    async fn fetch_discovery(&self) -> Result<DiscoveryDocument> {
        let url = parse_url(&format!("{}/{}", self.authority, DISCOVERY_PATH))?;
        log_debug(LogServiceType::Idp, format!("GET {}", url));
        let response = ensure_success(&Method::GET, self.client.get(url).send().await?)?;
        let document = response.json::<DiscoveryDocument>().await?;
        self.validate(&document)?;
        Ok(document)
    }

    fn validate(&self, document: &DiscoveryDocument) -> Result<()> {
        if self.validate_issuer && document.issuer.trim_end_matches('/') != self.authority {
            return Err(Error::Discovery { reason: format!("Issuer name does not match authority: {}", document.issuer) });
        }
        for endpoint in document.endpoints() {
            let url = parse_url(endpoint).map_err(|e| Error::Discovery { reason: format!("{:?}", e) })?;
            if !same_origin(&url, &self.authority_url) {
                return Err(Error::Discovery { reason: format!("Endpoint is on a different host than authority: {}", endpoint) });
            }
        }
        Ok(())
    }
}

// Userinfo
impl IdpContext {
    pub async fn user_info(&self, endpoint: &str, token: Option<&str>) -> Result<UserInfo> {
        self.fetch_user_info(endpoint, token).await.map_err(|err| {
            log_error(LogServiceType::Idp, format!("Userinfo failed: {:?}", err));
            match err {
                Error::UserInfo { .. } => err,
                other => Error::UserInfo { reason: format!("{:?}", other) },
            }
        })
    }

    async fn fetch_user_info(&self, endpoint: &str, token: Option<&str>) -> Result<UserInfo> {
        let url = parse_url(endpoint)?;
        log_debug(LogServiceType::Idp, format!("GET {}", url));
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = ensure_success(&Method::GET, request.send().await?)?;
        let document = response.json::<Value>().await?;
        UserInfo::try_from(document)
    }
}

// Token endpoint
impl IdpContext {
    async fn token_endpoint(&self) -> Result<String> {
        let document = self.discover().await?;
        document.token_endpoint.ok_or_else(|| Error::Discovery { reason: "No token endpoint in discovery document".to_string() })
    }

    pub async fn request_client_credentials_token(&self, credentials: &ClientCredentials) -> Result<TokenResponse> {
        let endpoint = self.token_endpoint().await?;
        log_info(LogServiceType::Idp, format!("Requesting client credentials token for {}", credentials.client_id));
        self.post_token_form(&endpoint, &[
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("scope", credentials.scope.as_str()),
        ]).await
    }

    /// Authorization code exchange done at login; the result is what the cookie session stores.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str, client: &OidcClient) -> Result<TokenResponse> {
        let endpoint = self.token_endpoint().await?;
        log_info(LogServiceType::Idp, format!("Exchanging authorization code for {}", client.client_id));
        self.post_token_form(&endpoint, &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
        ]).await
    }

    async fn post_token_form(&self, endpoint: &str, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let url = parse_url(endpoint)?;
        log_debug(LogServiceType::Idp, format!("POST {}", url));
        let response = self.client.post(url).form(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(token_error) => Error::Token { error: token_error.error, description: token_error.error_description },
                Err(_) => Error::Status { method: Method::POST.to_string(), url, status: status.as_u16() },
            });
        }
        Ok(response.json::<TokenResponse>().await?)
    }
}


/// Fetches a fresh client credentials token for every request.
#[derive(Debug, Clone)]
pub struct ClientCredentialsSource {
    idp: IdpContext,
    credentials: ClientCredentials,
}

impl ClientCredentialsSource {
    pub fn new(idp: IdpContext, credentials: ClientCredentials) -> Self {
        ClientCredentialsSource { idp, credentials }
    }
}

#[async_trait]
impl AccessTokenSource for ClientCredentialsSource {
    async fn access_token(&self) -> Result<Option<String>> {
        let token = self.idp.request_client_credentials_token(&self.credentials).await?;
        Ok(Some(token.access_token))
    }
}
