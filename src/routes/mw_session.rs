use axum::async_trait;
use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::api::AccessTokenSource;
use crate::domain::token::TokenResponse;
use crate::tools::log::{log_debug, LogServiceType};
use crate::{error::Error, Result};

pub const ACCESS_TOKEN_COOKIE: &str = "movies.access_token";
pub const ID_TOKEN_COOKIE: &str = "movies.id_token";
pub const REFRESH_TOKEN_COOKIE: &str = "movies.refresh_token";

/// Tokens saved in the cookie session at login.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct UserSession {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl UserSession {
    pub fn from_cookies(jar: &CookieJar) -> Self {
        let read = |name: &str| jar.get(name).map(|c| c.value().to_string()).filter(|v| !v.is_empty());
        UserSession {
            access_token: read(ACCESS_TOKEN_COOKIE),
            id_token: read(ID_TOKEN_COOKIE),
            refresh_token: read(REFRESH_TOKEN_COOKIE),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn save(&self, mut jar: CookieJar) -> CookieJar {
        for (name, value) in self.cookie_values() {
            jar = match value {
                Some(value) => jar.add(session_cookie(name, value.clone())),
                None => jar.remove(Cookie::build(name).path("/")),
            };
        }
        jar
    }

    pub fn clear(jar: CookieJar) -> CookieJar {
        UserSession::default().save(jar)
    }

    fn cookie_values(&self) -> [(&'static str, &Option<String>); 3] {
        [
            (ACCESS_TOKEN_COOKIE, &self.access_token),
            (ID_TOKEN_COOKIE, &self.id_token),
            (REFRESH_TOKEN_COOKIE, &self.refresh_token),
        ]
    }
}

impl From<TokenResponse> for UserSession {
    fn from(value: TokenResponse) -> Self {
        UserSession {
            access_token: Some(value.access_token),
            id_token: value.id_token,
            refresh_token: value.refresh_token,
        }
    }
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

#[async_trait]
impl AccessTokenSource for UserSession {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.access_token.clone())
    }
}


pub async fn mw_session(jar: CookieJar, mut req: Request, next: Next) -> Response {
    let session = UserSession::from_cookies(&jar);
    if !session.is_authenticated() {
        log_debug(LogServiceType::Session, format!("No session for {}", req.uri()));
    }
    req.extensions_mut().insert(session);
    next.run(req).await
}


#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserSession {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        if let Some(session) = parts.extensions.get::<UserSession>() {
            return Ok(session.clone());
        }
        Ok(UserSession::from_cookies(&CookieJar::from_headers(&parts.headers)))
    }
}
