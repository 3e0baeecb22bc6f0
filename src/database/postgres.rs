use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::database::models::polygon::{Polygon, PolygonDraft, PolygonPatch};
use crate::database::models::user::{NewUser, User};
use crate::database::store::{PolygonStore, StoreError, UserStore};

const POLYGON_COLUMNS: &str = "id, owner_key, name, coordinates, height, fill_color, \
     fill_opacity, stroke_color, stroke_opacity, stroke_width";

/// Postgres-backed polygon store. Each mutation runs inside one
/// transaction scoped to the request; an early error return drops the
/// transaction, which rolls it back.
pub struct PgPolygonStore {
    pool: PgPool,
}

impl PgPolygonStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PolygonStore for PgPolygonStore {
    async fn list(&self, owner: Option<&str>) -> Result<Vec<Polygon>, StoreError> {
        let polygons = match owner {
            Some(owner) => {
                sqlx::query_as::<_, Polygon>(&format!(
                    "SELECT {POLYGON_COLUMNS} FROM polygons WHERE owner_key = $1 ORDER BY id"
                ))
                .bind(owner)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Polygon>(&format!(
                    "SELECT {POLYGON_COLUMNS} FROM polygons ORDER BY id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(polygons)
    }

    async fn insert(&self, draft: PolygonDraft) -> Result<i32, StoreError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO polygons \
             (owner_key, name, coordinates, height, fill_color, fill_opacity, \
              stroke_color, stroke_opacity, stroke_width) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(&draft.owner_key)
        .bind(&draft.name)
        .bind(Json(&draft.coordinates))
        .bind(draft.height)
        .bind(&draft.fill_color)
        .bind(draft.fill_opacity)
        .bind(&draft.stroke_color)
        .bind(draft.stroke_opacity)
        .bind(draft.stroke_width)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(
        &self,
        owner: Option<&str>,
        id: i32,
        patch: &PolygonPatch,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Polygon>(&format!(
            "SELECT {POLYGON_COLUMNS} FROM polygons WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut polygon) = row else {
            return Err(StoreError::NotFound);
        };

        // Ownership mismatch is indistinguishable from absence here.
        if let Some(owner) = owner {
            if polygon.owner_key.as_deref() != Some(owner) {
                return Err(StoreError::NotFound);
            }
        }

        patch.apply(&mut polygon);

        sqlx::query(
            "UPDATE polygons SET name = $1, coordinates = $2, height = $3, \
             fill_color = $4, fill_opacity = $5, stroke_color = $6, \
             stroke_opacity = $7, stroke_width = $8 \
             WHERE id = $9",
        )
        .bind(&polygon.name)
        .bind(&polygon.coordinates)
        .bind(polygon.height)
        .bind(&polygon.fill_color)
        .bind(polygon.fill_opacity)
        .bind(&polygon.stroke_color)
        .bind(polygon.stroke_opacity)
        .bind(polygon.stroke_width)
        .bind(polygon.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, owner: Option<&str>, id: i32) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let owner_key = sqlx::query_scalar::<_, Option<String>>(
            "SELECT owner_key FROM polygons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(owner_key) = owner_key else {
            return Err(StoreError::NotFound);
        };

        if let Some(owner) = owner {
            if owner_key.as_deref() != Some(owner) {
                return Err(StoreError::Forbidden);
            }
        }

        sqlx::query("DELETE FROM polygons WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Postgres-backed user store.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, external_id, email, name";

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_or_create(&self, new_user: &NewUser) -> Result<User, StoreError> {
        // Single statement so two concurrent first callbacks for the same
        // subject cannot both insert; the loser returns no row and falls
        // through to the SELECT of the winner's row.
        let inserted = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (external_id, email, name) VALUES ($1, $2, $3) \
             ON CONFLICT (external_id) DO NOTHING \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.external_id)
        .bind(&new_user.email)
        .bind(&new_user.name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(user) = inserted {
            return Ok(user);
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1"
        ))
        .bind(&new_user.external_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
