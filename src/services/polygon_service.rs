use std::sync::Arc;

use crate::database::models::polygon::{Polygon, PolygonPatch};
use crate::database::store::{PolygonStore, StoreError};

/// CRUD operations over the record store, parameterized by the owner key
/// resolved for the request. Applies the default-value and partial-update
/// policy; the owner always comes from the resolver, never from client
/// data.
#[derive(Clone)]
pub struct PolygonService {
    store: Arc<dyn PolygonStore>,
}

impl PolygonService {
    pub fn new(store: Arc<dyn PolygonStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, owner: Option<&str>) -> Result<Vec<Polygon>, StoreError> {
        self.store.list(owner).await
    }

    pub async fn create(
        &self,
        owner: Option<&str>,
        patch: PolygonPatch,
    ) -> Result<i32, StoreError> {
        let id = self.store.insert(patch.into_draft(owner)).await?;
        tracing::debug!(id, "created polygon");
        Ok(id)
    }

    pub async fn update(
        &self,
        owner: Option<&str>,
        id: i32,
        patch: &PolygonPatch,
    ) -> Result<(), StoreError> {
        self.store.update(owner, id, patch).await?;
        tracing::debug!(id, "updated polygon");
        Ok(())
    }

    pub async fn delete(&self, owner: Option<&str>, id: i32) -> Result<(), StoreError> {
        self.store.delete(owner, id).await?;
        tracing::debug!(id, "deleted polygon");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryPolygonStore;

    fn service() -> PolygonService {
        PolygonService::new(Arc::new(MemoryPolygonStore::new()))
    }

    fn named(name: &str) -> PolygonPatch {
        PolygonPatch {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_returns_fresh_ids_and_list_round_trips() {
        let service = service();
        let first = service.create(Some("a"), named("one")).await.unwrap();
        let second = service.create(Some("a"), named("two")).await.unwrap();
        assert_ne!(first, second);

        let polygons = service.list(Some("a")).await.unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].id, first);
        assert_eq!(polygons[0].name, "one");
        // Undeclared fields carry the documented defaults
        assert_eq!(polygons[0].height, 300.0);
        assert_eq!(polygons[0].fill_opacity, 0.5);
    }

    #[tokio::test]
    async fn owner_isolation_holds_across_operations() {
        let service = service();
        let id = service.create(Some("a"), named("mine")).await.unwrap();

        assert!(service.list(Some("b")).await.unwrap().is_empty());
        assert!(matches!(
            service.update(Some("b"), id, &named("stolen")).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            service.delete(Some("b"), id).await,
            Err(StoreError::Forbidden)
        ));

        // The record is untouched for its owner
        let polygons = service.list(Some("a")).await.unwrap();
        assert_eq!(polygons[0].name, "mine");
    }

    #[tokio::test]
    async fn update_misses_are_not_found() {
        let service = service();
        assert!(matches!(
            service.update(Some("a"), 99, &named("x")).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_is_not_idempotent() {
        let service = service();
        let id = service.create(Some("a"), named("gone")).await.unwrap();
        service.delete(Some("a"), id).await.unwrap();
        assert!(matches!(
            service.delete(Some("a"), id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn unscoped_deployment_sees_everything() {
        let service = service();
        let id = service.create(None, named("shared")).await.unwrap();
        assert_eq!(service.list(None).await.unwrap().len(), 1);
        service
            .update(None, id, &named("renamed"))
            .await
            .unwrap();
        service.delete(None, id).await.unwrap();
        assert!(service.list(None).await.unwrap().is_empty());
    }
}
