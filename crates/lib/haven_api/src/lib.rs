//! # haven_api
//!
//! HTTP API library for Haven.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::Router;
use axum::routing::{delete, get, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{auth, directory, health, resources};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `haven_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    haven_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/refresh-token", post(auth::refresh_handler))
        .route("/api/locations/list", get(directory::list_locations_handler))
        .route(
            "/api/categories/list",
            get(directory::list_categories_handler),
        );

    // Optional-auth routes: anonymous requests pass through, a valid
    // bearer token attaches the acting user.
    let optional = Router::new()
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/resources/list", get(resources::list_handler))
        .route("/api/resources/{resource_id}", get(resources::read_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::optional_auth,
        ));

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/api/auth/revoke-token", post(auth::revoke_token_handler))
        .route("/api/auth/revoke-all/{user_id}", post(auth::revoke_all_handler))
        .route("/api/auth/me", get(auth::me_handler))
        .route("/api/resources/create", post(resources::create_handler))
        .route(
            "/api/resources/update/{resource_id}",
            post(resources::update_handler),
        )
        .route(
            "/api/resources/delete/{resource_id}",
            delete(resources::delete_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(optional)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
