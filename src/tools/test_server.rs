use std::{collections::{BTreeMap, HashMap}, sync::Arc};

use axum::{extract::{Path, State}, http::{HeaderMap, StatusCode}, response::{IntoResponse, Response}, routing::{get, post}, Form, Json, Router};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{config::ClientConfig, domain::movie::Movie, tools::http_tools::{extract_bearer, extract_header}};

pub const VALID_TOKEN: &str = "valid-access-token";
pub const VALID_CODE: &str = "valid-code";

/// In-process movies api and identity provider listening on an ephemeral port.
pub struct TestServer {
    pub url: String,
    pub state: FakeState,
}

#[derive(Clone)]
pub struct FakeState {
    movies: Arc<Mutex<BTreeMap<i32, Movie>>>,
    issuer: Arc<Mutex<String>>,
    base: String,
    last_token_form: Arc<Mutex<Option<HashMap<String, String>>>>,
}

impl FakeState {
    pub async fn set_issuer(&self, issuer: &str) {
        *self.issuer.lock().await = issuer.to_string();
    }

    pub async fn last_token_form(&self) -> Option<HashMap<String, String>> {
        self.last_token_form.lock().await.clone()
    }
}

impl TestServer {
    pub async fn start() -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let state = FakeState {
            movies: Arc::new(Mutex::new(BTreeMap::new())),
            issuer: Arc::new(Mutex::new(url.clone())),
            base: url.clone(),
            last_token_form: Arc::new(Mutex::new(None)),
        };

        let movies = Router::new()
            .route("/", get(handler_list).post(handler_post))
            .route("/:id", get(handler_get).put(handler_put).delete(handler_delete));

        let app = Router::new()
            .nest("/movies", movies.clone())
            .nest("/api/movies", movies)
            .route("/.well-known/openid-configuration", get(handler_discovery))
            .route("/connect/token", post(handler_token))
            .route("/connect/userinfo", get(handler_userinfo))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer { url, state }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_url: format!("{}/", self.url),
            authority: self.url.clone(),
            ..Default::default()
        }
    }
}

fn check_request(headers: &HeaderMap) -> Option<Response> {
    if extract_header(headers, http::header::ACCEPT) != Some("application/json") {
        return Some(StatusCode::NOT_ACCEPTABLE.into_response());
    }
    if extract_bearer(headers) != Some(VALID_TOKEN) {
        return Some(StatusCode::UNAUTHORIZED.into_response());
    }
    None
}

async fn handler_list(State(state): State<FakeState>, headers: HeaderMap) -> Response {
    if let Some(rejection) = check_request(&headers) { return rejection; }
    let movies: Vec<Movie> = state.movies.lock().await.values().cloned().collect();
    Json(movies).into_response()
}

async fn handler_get(State(state): State<FakeState>, headers: HeaderMap, Path(id): Path<i32>) -> Response {
    if let Some(rejection) = check_request(&headers) { return rejection; }
    match state.movies.lock().await.get(&id) {
        Some(movie) => Json(movie.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn handler_post(State(state): State<FakeState>, headers: HeaderMap, Json(mut movie): Json<Movie>) -> Response {
    if let Some(rejection) = check_request(&headers) { return rejection; }
    let mut movies = state.movies.lock().await;
    if movie.id == 0 {
        movie.id = movies.keys().last().map(|id| id + 1).unwrap_or(1);
    }
    movies.insert(movie.id, movie.clone());
    (StatusCode::CREATED, Json(movie)).into_response()
}

async fn handler_put(State(state): State<FakeState>, headers: HeaderMap, Path(id): Path<i32>, Json(movie): Json<Movie>) -> Response {
    if let Some(rejection) = check_request(&headers) { return rejection; }
    if movie.id != id {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let mut movies = state.movies.lock().await;
    if !movies.contains_key(&id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    movies.insert(id, movie);
    StatusCode::NO_CONTENT.into_response()
}

async fn handler_delete(State(state): State<FakeState>, headers: HeaderMap, Path(id): Path<i32>) -> Response {
    if let Some(rejection) = check_request(&headers) { return rejection; }
    match state.movies.lock().await.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn handler_discovery(State(state): State<FakeState>) -> Json<Value> {
    let issuer = state.issuer.lock().await.clone();
    Json(json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{}/connect/authorize", state.base),
        "token_endpoint": format!("{}/connect/token", state.base),
        "userinfo_endpoint": format!("{}/connect/userinfo", state.base),
        "end_session_endpoint": format!("{}/connect/endsession", state.base),
        "jwks_uri": format!("{}/.well-known/openid-configuration/jwks", state.base),
        "scopes_supported": ["openid", "profile", "movieAPI"],
    }))
}

async fn handler_token(State(state): State<FakeState>, Form(form): Form<HashMap<String, String>>) -> Response {
    *state.last_token_form.lock().await = Some(form.clone());
    let field = |name: &str| form.get(name).map(String::as_str);

    let granted = match field("grant_type") {
        Some("client_credentials") => {
            if field("client_id") != Some("movieClient") || field("client_secret") != Some("secret") {
                return token_error("invalid_client");
            }
            json!({ "access_token": VALID_TOKEN, "token_type": "Bearer", "expires_in": 3600, "scope": "movieAPI" })
        },
        Some("authorization_code") => {
            if field("code") != Some(VALID_CODE) {
                return token_error("invalid_grant");
            }
            json!({ "access_token": VALID_TOKEN, "token_type": "Bearer", "expires_in": 3600, "id_token": "header.payload.signature", "scope": "openid profile" })
        },
        _ => return token_error("unsupported_grant_type"),
    };
    Json(granted).into_response()
}

fn token_error(error: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response()
}

async fn handler_userinfo(headers: HeaderMap) -> Response {
    if extract_bearer(&headers) != Some(VALID_TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "sub": "818727",
        "name": "Alice Smith",
        "given_name": "Alice",
        "family_name": "Smith",
        "website": "http://alice.com"
    })).into_response()
}
