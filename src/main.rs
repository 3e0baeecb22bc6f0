use std::sync::Arc;

use polymap_api::app::{app, AppState};
use polymap_api::auth::oauth::OAuthClient;
use polymap_api::config::AppConfig;
use polymap_api::database::postgres::{PgPolygonStore, PgUserStore};
use polymap_api::database::connect_pool;
use polymap_api::services::PolygonService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    tracing::info!("starting polymap-api with {:?} identity strategy", config.auth);

    let pool = connect_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let oauth = config
        .oauth
        .clone()
        .map(|oauth_config| Arc::new(OAuthClient::new(oauth_config)));

    let state = AppState {
        polygons: PolygonService::new(Arc::new(PgPolygonStore::new(pool.clone()))),
        users: Arc::new(PgUserStore::new(pool)),
        oauth,
        config: Arc::new(config),
    };

    let bind_addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
