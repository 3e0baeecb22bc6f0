use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use crate::app::AppState;
use crate::database::models::polygon::{Polygon, PolygonPatch};
use crate::error::ApiError;
use crate::middleware::Owner;

/// GET /api/polygons - All polygons visible to the caller
pub async fn list(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
) -> Result<Json<Vec<Polygon>>, ApiError> {
    let polygons = state.polygons.list(owner.0.as_deref()).await?;
    Ok(Json(polygons))
}

/// POST /api/polygons - Create a polygon; omitted fields get their
/// documented defaults, the owner comes from the resolved identity.
pub async fn create(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    body: Result<Json<PolygonPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(patch) = body.map_err(bad_body)?;
    let id = state.polygons.create(owner.0.as_deref(), patch).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// PUT /api/polygons/:id - Partial update; supplied fields overwrite,
/// omitted fields keep their stored values.
pub async fn update(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<i32>,
    body: Result<Json<PolygonPatch>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(patch) = body.map_err(bad_body)?;
    state.polygons.update(owner.0.as_deref(), id, &patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/polygons/:id - Delete, enforcing ownership.
pub async fn remove(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.polygons.delete(owner.0.as_deref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
}
