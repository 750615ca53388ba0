//! Resource CRUD request handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::LoadedResource;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CreateResourceRequest, ExpandQuery, ResourceView, UpdateResourceRequest};
use crate::services::resources;

/// `GET /api/resources/list` — all resources. The `locations` and
/// `categories` query flags expand references into full objects.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(expand): Query<ExpandQuery>,
) -> AppResult<Json<Vec<ResourceView>>> {
    let resp = resources::list(&state.pool, expand).await?;
    Ok(Json(resp))
}

/// `POST /api/resources/create` — create a resource.
pub async fn create_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<CreateResourceRequest>,
) -> AppResult<Json<ResourceView>> {
    let resp = resources::create(&state.pool, &user.0, body).await?;
    Ok(Json(resp))
}

/// `GET /api/resources/{resource_id}` — a single resource, with the same
/// expansion flags as the list.
pub async fn read_handler(
    State(state): State<AppState>,
    Query(expand): Query<ExpandQuery>,
    LoadedResource(resource): LoadedResource,
) -> AppResult<Json<ResourceView>> {
    let resp = resources::view(&state.pool, resource, expand).await?;
    Ok(Json(resp))
}

/// `POST /api/resources/update/{resource_id}` — partial update, gated on
/// ownership or the OWNER role.
pub async fn update_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    LoadedResource(resource): LoadedResource,
    Json(body): Json<UpdateResourceRequest>,
) -> AppResult<Json<ResourceView>> {
    let resp = resources::update(&state.pool, &user.0, resource, body).await?;
    Ok(Json(resp))
}

/// `DELETE /api/resources/delete/{resource_id}` — remove a resource.
pub async fn delete_handler(
    State(state): State<AppState>,
    axum::Extension(_user): axum::Extension<AuthenticatedUser>,
    LoadedResource(resource): LoadedResource,
) -> AppResult<StatusCode> {
    resources::delete(&state.pool, resource).await?;
    Ok(StatusCode::NO_CONTENT)
}
