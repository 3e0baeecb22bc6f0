use serde::Serialize;

/// A user established by the OAuth login flow. Created lazily on the first
/// successful callback for a new subject claim; never mutated or deleted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    /// Stable subject claim asserted by the identity provider.
    pub external_id: String,
    pub email: String,
    pub name: String,
}

/// Identity-provider claims for a user that may not exist yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: String,
    pub email: String,
    pub name: String,
}
