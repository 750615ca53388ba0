//! Request extractors.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, Path};
use axum::http::request::Parts;
use uuid::Uuid;

use haven_core::directory::{self, ResourceRow};

use crate::AppState;
use crate::error::AppError;

/// Client IP for audit stamping of refresh tokens.
///
/// Prefers the first `X-Forwarded-For` hop, then the socket address from
/// `ConnectInfo` (populated when serving with
/// `into_make_service_with_connect_info`), then `"unknown"`.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let ip = forwarded.unwrap_or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string())
        });

        Ok(Self(ip))
    }
}

/// Route-parameter hook: resolves `{resource_id}` to a loaded resource
/// before the handler runs. Malformed IDs map to 400, missing rows to 404.
#[derive(Debug, Clone)]
pub struct LoadedResource(pub ResourceRow);

impl FromRequestParts<AppState> for LoadedResource {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let Path(resource_id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Validation("Invalid resource id".into()))?;

        let row = directory::get_resource(&state.pool, &resource_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {resource_id} not found")))?;

        Ok(Self(row))
    }
}
