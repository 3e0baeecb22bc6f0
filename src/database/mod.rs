// Record store: models, storage traits, and the Postgres and in-memory
// implementations.
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connects the shared pool. Idle connections are recycled after five
/// minutes and every checkout is ping-tested first, since the pool is the
/// only long-lived resource in the process.
pub async fn connect_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .idle_timeout(Duration::from_secs(300))
        .test_before_acquire(true)
        .connect(database_url)
        .await
}
