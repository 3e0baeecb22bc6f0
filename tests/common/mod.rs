#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use serde_json::Value;

use polymap_api::app::{app, AppState};
use polymap_api::auth::oauth::OAuthClient;
use polymap_api::config::{AppConfig, AuthMode, OAuthConfig, SessionConfig};
use polymap_api::database::memory::{MemoryPolygonStore, MemoryUserStore};
use polymap_api::database::store::PolygonStore;
use polymap_api::services::PolygonService;

pub const SESSION_SECRET: &str = "integration-test-secret";
pub const IDENTITY_HEADER: &str = "X-Firebase-UserId";

pub fn session_config() -> SessionConfig {
    SessionConfig {
        secret: SESSION_SECRET.to_string(),
        ttl_hours: 1,
    }
}

fn oauth_config() -> OAuthConfig {
    OAuthConfig {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        auth_url: "https://provider.test/authorize".to_string(),
        token_url: "https://provider.test/token".to_string(),
        userinfo_url: "https://provider.test/userinfo".to_string(),
        redirect_url: "http://localhost:3000/oauth-callback".to_string(),
    }
}

/// Application wired to in-memory stores. Clone the router per request;
/// the stores are shared behind the state.
pub fn test_app(auth: AuthMode) -> Router {
    test_app_with_polygons(auth, Arc::new(MemoryPolygonStore::new()))
}

/// Same, but around a caller-supplied polygon store.
pub fn test_app_with_polygons(auth: AuthMode, store: Arc<dyn PolygonStore>) -> Router {
    let session_mode = auth == AuthMode::Session;
    let config = AppConfig {
        port: 0,
        database_url: String::new(),
        maps_api_key: Some("test-maps-key".to_string()),
        auth,
        identity_header: IDENTITY_HEADER.to_string(),
        session: session_mode.then(session_config),
        oauth: session_mode.then(oauth_config),
    };

    let oauth = config
        .oauth
        .clone()
        .map(|oauth_config| Arc::new(OAuthClient::new(oauth_config)));

    app(AppState {
        config: Arc::new(config),
        polygons: PolygonService::new(store),
        users: Arc::new(MemoryUserStore::new()),
        oauth,
    })
}

pub fn api_json(method: &str, uri: &str, owner: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(IDENTITY_HEADER, owner)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn api_empty(method: &str, uri: &str, owner: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(IDENTITY_HEADER, owner)
        .body(Body::empty())
        .unwrap()
}

pub fn anonymous(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
