//! Resource service — CRUD flows plus reference expansion and the
//! update permission check.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use haven_core::directory::{self, ResourceRow};
use haven_core::models::auth::TokenClaims;

use crate::error::{AppError, AppResult};
use crate::models::{
    CategoryRef, CreateResourceRequest, ExpandQuery, LocationRef, ResourceView,
    UpdateResourceRequest,
};
use crate::services::auth::resolve_actor;

/// List all resources, expanding references per the query flags.
pub async fn list(pool: &PgPool, expand: ExpandQuery) -> AppResult<Vec<ResourceView>> {
    let rows = directory::list_resources(pool).await?;
    expand_views(pool, rows, expand).await
}

/// Build the API view of a single resource.
pub async fn view(pool: &PgPool, row: ResourceRow, expand: ExpandQuery) -> AppResult<ResourceView> {
    let mut views = expand_views(pool, vec![row], expand).await?;
    // expand_views preserves input length
    Ok(views.remove(0))
}

/// Create a new resource owned by the authenticated user.
pub async fn create(
    pool: &PgPool,
    actor: &TokenClaims,
    body: CreateResourceRequest,
) -> AppResult<ResourceView> {
    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Resource name is required".into()))?;

    let created_by = Uuid::parse_str(&actor.sub).ok();

    let row = directory::create_resource(
        pool,
        name,
        body.description.as_deref(),
        body.website.as_deref(),
        body.location_ids.as_deref().unwrap_or(&[]),
        body.category_ids.as_deref().unwrap_or(&[]),
        created_by.as_ref(),
    )
    .await?;

    Ok(ResourceView::bare(row))
}

/// Update a resource. The actor must be OWNER or hold the resource in
/// their `editable_resources` list; absent fields keep current values.
pub async fn update(
    pool: &PgPool,
    actor: &TokenClaims,
    resource: ResourceRow,
    body: UpdateResourceRequest,
) -> AppResult<ResourceView> {
    let actor_row = resolve_actor(pool, actor).await?;
    if !actor_row.is_owner() && !actor_row.editable_resources.contains(&resource.id) {
        return Err(AppError::Unauthorized(
            "Not permitted to edit this resource".into(),
        ));
    }

    let row = directory::update_resource(
        pool,
        &resource.id,
        body.name.as_deref(),
        body.description.as_deref(),
        body.website.as_deref(),
        body.location_ids.as_deref(),
        body.category_ids.as_deref(),
    )
    .await?;

    Ok(ResourceView::bare(row))
}

/// Delete a resource.
pub async fn delete(pool: &PgPool, resource: ResourceRow) -> AppResult<()> {
    directory::delete_resource(pool, &resource.id).await?;
    Ok(())
}

/// Expand resource rows into API views. With a flag set, bare IDs become
/// full objects fetched in one query per entity kind; dangling references
/// are dropped from the expanded output.
async fn expand_views(
    pool: &PgPool,
    rows: Vec<ResourceRow>,
    expand: ExpandQuery,
) -> AppResult<Vec<ResourceView>> {
    let locations = if expand.locations {
        let ids = collect_ids(rows.iter().map(|r| &r.location_ids));
        let fetched = directory::locations_by_ids(pool, &ids).await?;
        Some(
            fetched
                .into_iter()
                .map(|l| (l.id, l))
                .collect::<HashMap<_, _>>(),
        )
    } else {
        None
    };

    let categories = if expand.categories {
        let ids = collect_ids(rows.iter().map(|r| &r.category_ids));
        let fetched = directory::categories_by_ids(pool, &ids).await?;
        Some(
            fetched
                .into_iter()
                .map(|c| (c.id, c))
                .collect::<HashMap<_, _>>(),
        )
    } else {
        None
    };

    Ok(rows
        .into_iter()
        .map(|row| {
            let location_refs = match &locations {
                Some(map) => row
                    .location_ids
                    .iter()
                    .filter_map(|id| map.get(id).map(|l| LocationRef::Full(l.clone().into())))
                    .collect(),
                None => row.location_ids.iter().copied().map(LocationRef::Id).collect(),
            };
            let category_refs = match &categories {
                Some(map) => row
                    .category_ids
                    .iter()
                    .filter_map(|id| map.get(id).map(|c| CategoryRef::Full(c.clone().into())))
                    .collect(),
                None => row.category_ids.iter().copied().map(CategoryRef::Id).collect(),
            };
            ResourceView {
                id: row.id,
                name: row.name,
                description: row.description,
                website: row.website,
                locations: location_refs,
                categories: category_refs,
                created_by: row.created_by,
                created_at: row.created_at,
                updated_at: row.updated_at,
            }
        })
        .collect())
}

/// Deduplicated union of all referenced IDs.
fn collect_ids<'a>(lists: impl Iterator<Item = &'a Vec<Uuid>>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = lists.flatten().copied().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
