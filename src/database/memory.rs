use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::models::polygon::{Polygon, PolygonDraft, PolygonPatch};
use crate::database::models::user::{NewUser, User};
use crate::database::store::{PolygonStore, StoreError, UserStore};

/// In-memory polygon store with the same visibility and ownership
/// semantics as the Postgres store. Used by tests and local development
/// without a database.
#[derive(Default)]
pub struct MemoryPolygonStore {
    inner: RwLock<PolygonRows>,
}

#[derive(Default)]
struct PolygonRows {
    rows: HashMap<i32, Polygon>,
    next_id: i32,
}

impl MemoryPolygonStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolygonStore for MemoryPolygonStore {
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Polygon>, StoreError> {
        let inner = self.inner.read().await;
        let mut polygons: Vec<Polygon> = inner
            .rows
            .values()
            .filter(|p| match owner {
                Some(owner) => p.owner_key.as_deref() == Some(owner),
                None => true,
            })
            .cloned()
            .collect();
        polygons.sort_by_key(|p| p.id);
        Ok(polygons)
    }

    async fn insert(&self, draft: PolygonDraft) -> Result<i32, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.insert(id, draft.into_polygon(id));
        Ok(id)
    }

    async fn update(
        &self,
        owner: Option<&str>,
        id: i32,
        patch: &PolygonPatch,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let polygon = inner.rows.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(owner) = owner {
            if polygon.owner_key.as_deref() != Some(owner) {
                return Err(StoreError::NotFound);
            }
        }
        patch.apply(polygon);
        Ok(())
    }

    async fn delete(&self, owner: Option<&str>, id: i32) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let polygon = inner.rows.get(&id).ok_or(StoreError::NotFound)?;
        if let Some(owner) = owner {
            if polygon.owner_key.as_deref() != Some(owner) {
                return Err(StoreError::Forbidden);
            }
        }
        inner.rows.remove(&id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory user store keyed by subject claim.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<UserRows>,
}

#[derive(Default)]
struct UserRows {
    by_subject: HashMap<String, User>,
    next_id: i32,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_or_create(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.by_subject.get(&new_user.external_id) {
            return Ok(user.clone());
        }
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            external_id: new_user.external_id.clone(),
            email: new_user.email.clone(),
            name: new_user.name.clone(),
        };
        inner
            .by_subject
            .insert(new_user.external_id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.by_subject.values().find(|u| u.id == id).cloned())
    }
}
