//! Location and category listing handlers (client filter sources).

use axum::Json;
use axum::extract::State;

use haven_core::directory;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{CategoryInfo, LocationInfo};

/// `GET /api/locations/list` — all locations.
pub async fn list_locations_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<LocationInfo>>> {
    let rows = directory::list_locations(&state.pool).await?;
    Ok(Json(rows.into_iter().map(LocationInfo::from).collect()))
}

/// `GET /api/categories/list` — all categories.
pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategoryInfo>>> {
    let rows = directory::list_categories(&state.pool).await?;
    Ok(Json(rows.into_iter().map(CategoryInfo::from).collect()))
}
