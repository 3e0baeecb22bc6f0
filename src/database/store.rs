use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::polygon::{Polygon, PolygonDraft, PolygonPatch};
use crate::database::models::user::{NewUser, User};

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// The record exists but belongs to a different owner. Only delete
    /// surfaces this; update reports a mismatch as `NotFound` so absence
    /// and foreign ownership are indistinguishable to the caller.
    #[error("owner mismatch")]
    Forbidden,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Durable storage for polygon records. `owner` is the owner key resolved
/// for the request; `None` means owner scoping is off for this deployment.
#[async_trait]
pub trait PolygonStore: Send + Sync {
    /// All polygons visible to the owner, in stable insertion order.
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Polygon>, StoreError>;

    /// Persists a fully-defaulted draft and returns the generated id.
    async fn insert(&self, draft: PolygonDraft) -> Result<i32, StoreError>;

    /// Whole-row read-merge-write inside one transaction. Two concurrent
    /// partial updates race at row granularity; last commit wins.
    async fn update(&self, owner: Option<&str>, id: i32, patch: &PolygonPatch)
        -> Result<(), StoreError>;

    async fn delete(&self, owner: Option<&str>, id: i32) -> Result<(), StoreError>;

    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Storage for users established by the OAuth login flow.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up the user by subject claim, creating the row on first
    /// sight. Repeated calls with the same subject resolve to the same
    /// user and create nothing.
    async fn find_or_create(&self, new_user: &NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;
}
