//! Resource, location, and category persistence.
//!
//! Resources reference locations and categories through plain `uuid[]`
//! columns without FK constraints; references are loose and may dangle.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::uuid::uuidv7;

/// Row returned by resource queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResourceRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub location_ids: Vec<Uuid>,
    pub category_ids: Vec<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row returned by location queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationRow {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row returned by category queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

const RESOURCE_COLUMNS: &str = "id, name, description, website, location_ids, category_ids, \
     created_by, created_at, updated_at";

/// List all resources, newest first.
pub async fn list_resources(pool: &PgPool) -> Result<Vec<ResourceRow>, sqlx::Error> {
    sqlx::query_as::<_, ResourceRow>(&format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

/// Get a resource by ID.
pub async fn get_resource(pool: &PgPool, id: &Uuid) -> Result<Option<ResourceRow>, sqlx::Error> {
    sqlx::query_as::<_, ResourceRow>(&format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Create a new resource.
pub async fn create_resource(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    website: Option<&str>,
    location_ids: &[Uuid],
    category_ids: &[Uuid],
    created_by: Option<&Uuid>,
) -> Result<ResourceRow, sqlx::Error> {
    sqlx::query_as::<_, ResourceRow>(&format!(
        "INSERT INTO resources \
             (id, name, description, website, location_ids, category_ids, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {RESOURCE_COLUMNS}"
    ))
    .bind(uuidv7())
    .bind(name)
    .bind(description)
    .bind(website)
    .bind(location_ids)
    .bind(category_ids)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

/// Partially update a resource. `None` fields keep their current values.
pub async fn update_resource(
    pool: &PgPool,
    id: &Uuid,
    name: Option<&str>,
    description: Option<&str>,
    website: Option<&str>,
    location_ids: Option<&[Uuid]>,
    category_ids: Option<&[Uuid]>,
) -> Result<ResourceRow, sqlx::Error> {
    sqlx::query_as::<_, ResourceRow>(&format!(
        "UPDATE resources SET \
             name = COALESCE($2, name), \
             description = COALESCE($3, description), \
             website = COALESCE($4, website), \
             location_ids = COALESCE($5, location_ids), \
             category_ids = COALESCE($6, category_ids), \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING {RESOURCE_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(website)
    .bind(location_ids)
    .bind(category_ids)
    .fetch_one(pool)
    .await
}

/// Delete a resource by ID. Returns whether a row was removed.
pub async fn delete_resource(pool: &PgPool, id: &Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM resources WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// List all locations, by name.
pub async fn list_locations(pool: &PgPool) -> Result<Vec<LocationRow>, sqlx::Error> {
    sqlx::query_as::<_, LocationRow>(
        "SELECT id, name, address, city, created_at FROM locations ORDER BY name",
    )
    .fetch_all(pool)
    .await
}

/// Fetch locations by ID set (for expanding resource references).
pub async fn locations_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<LocationRow>, sqlx::Error> {
    sqlx::query_as::<_, LocationRow>(
        "SELECT id, name, address, city, created_at FROM locations WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await
}

/// List all categories, by name.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<CategoryRow>, sqlx::Error> {
    sqlx::query_as::<_, CategoryRow>("SELECT id, name, created_at FROM categories ORDER BY name")
        .fetch_all(pool)
        .await
}

/// Fetch categories by ID set (for expanding resource references).
pub async fn categories_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<CategoryRow>, sqlx::Error> {
    sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, created_at FROM categories WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await
}
