pub mod identity;

pub use identity::{require_identity, resolve_owner, Owner};
