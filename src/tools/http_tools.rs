use std::fmt::Display;

use reqwest::Url;

use crate::{Error, Result};

const BEARER: &str = "Bearer ";

pub fn extract_header(headers: &http::HeaderMap, name: http::HeaderName) -> Option<&str>{
    headers.get(name).and_then(|l| l.to_str().ok())
}

pub fn extract_bearer(headers: &http::HeaderMap) -> Option<&str> {
    extract_header(headers, http::header::AUTHORIZATION).and_then(|h| h.strip_prefix(BEARER))
}

pub fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))
}

pub fn join_url(base: &Url, path: &str) -> Result<Url> {
    base.join(path).map_err(|e| Error::InvalidUrl(format!("{}{}: {}", base, path, e)))
}

/// `/movies` + `3` -> `/movies/3`
pub fn resource_path(collection: &str, id: impl Display) -> String {
    format!("{}/{}", collection.trim_end_matches('/'), id)
}

pub fn same_origin(left: &Url, right: &Url) -> bool {
    left.scheme() == right.scheme() && left.host_str() == right.host_str() && left.port_or_known_default() == right.port_or_known_default()
}



#[cfg(test)]
mod tests {
    use http::{HeaderMap, HeaderValue};

    use super::*;

    #[test]
    fn bearer_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);
        headers.insert(http::header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract_bearer(&headers), Some("abc"));
        headers.insert(http::header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn paths() {
        assert_eq!(resource_path("/movies", 3), "/movies/3");
        assert_eq!(resource_path("/api/movies/", 12), "/api/movies/12");

        let base = parse_url("https://localhost:5001/").unwrap();
        assert_eq!(join_url(&base, "/movies/3").unwrap().as_str(), "https://localhost:5001/movies/3");
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn origins() {
        let authority = parse_url("https://localhost:5005").unwrap();
        assert!(same_origin(&authority, &parse_url("https://localhost:5005/connect/userinfo").unwrap()));
        assert!(!same_origin(&authority, &parse_url("https://localhost:5006/connect/userinfo").unwrap()));
        assert!(!same_origin(&authority, &parse_url("http://localhost:5005/connect/userinfo").unwrap()));
        assert!(same_origin(&parse_url("https://idp.example").unwrap(), &parse_url("https://idp.example:443/x").unwrap()));
    }
}
