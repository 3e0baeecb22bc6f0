use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::oauth::OAuthClient;
use crate::config::{AppConfig, AuthMode};
use crate::database::store::UserStore;
use crate::handlers::{pages, polygons};
use crate::middleware::identity;
use crate::services::PolygonService;

/// Explicitly constructed application context passed into every handler.
/// No ambient singletons; tests build one of these around the in-memory
/// store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub polygons: PolygonService,
    pub users: Arc<dyn UserStore>,
    pub oauth: Option<Arc<OAuthClient>>,
}

pub fn app(state: AppState) -> Router {
    // Identity is resolved before any API handler runs; page routes
    // resolve inline because their failure mode is a redirect, not a 401.
    let api = Router::new()
        .route(
            "/api/polygons",
            get(polygons::list).post(polygons::create),
        )
        .route(
            "/api/polygons/:id",
            put(polygons::update).delete(polygons::remove),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            identity::require_identity,
        ));

    let mut router = Router::new()
        .route("/", get(pages::index))
        .route("/logout", get(pages::logout))
        .route("/health", get(pages::health))
        .merge(api);

    // Login routes exist only in the session-strategy deployment.
    if state.config.auth == AuthMode::Session {
        router = router
            .route("/login", get(pages::login))
            .route("/oauth-callback", get(pages::oauth_callback));
    }

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
