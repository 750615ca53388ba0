//! Authentication request handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ClientIp;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    LoginRequest, RefreshRequest, RegisterRequest, RevokeAllResponse, RevokeTokenRequest,
    RevokeTokenResponse, TokenPairResponse, UserInfo,
};
use crate::services::auth;

/// `POST /api/auth/login` — authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenPairResponse>> {
    let resp = auth::login(&state.pool, &state.config, &body.email, &body.password, &ip).await?;
    Ok(Json(resp))
}

/// `POST /api/auth/register` — create a new user account.
///
/// Authentication is optional: an OWNER actor may assign elevated
/// permissions, anyone else gets a stripped EDITOR account.
pub async fn register_handler(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    actor: Option<axum::Extension<AuthenticatedUser>>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<TokenPairResponse>> {
    let claims = actor.as_ref().map(|ext| &ext.0.0);
    let resp = auth::register(&state.pool, &state.config, body, claims, &ip).await?;
    Ok(Json(resp))
}

/// `POST /api/auth/refresh-token` — exchange a refresh token for a new
/// token pair (single-use rotation).
pub async fn refresh_handler(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<TokenPairResponse>> {
    let resp = auth::refresh(&state.pool, &state.config, &body.refresh_token, &ip).await?;
    Ok(Json(resp))
}

/// `POST /api/auth/revoke-token` — revoke a single refresh token.
pub async fn revoke_token_handler(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<RevokeTokenRequest>,
) -> AppResult<Json<RevokeTokenResponse>> {
    let resp = auth::revoke_token(&state.pool, &body.token, &user.0, &ip).await?;
    Ok(Json(resp))
}

/// `POST /api/auth/revoke-all/{user_id}` — revoke all active refresh
/// tokens for a user.
pub async fn revoke_all_handler(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<RevokeAllResponse>> {
    let resp = auth::revoke_all(&state.pool, &user_id, &user.0, &ip).await?;
    Ok(Json(resp))
}

/// `GET /api/auth/me` — the authenticated user's record.
pub async fn me_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<UserInfo>> {
    let resp = auth::current_user(&state.pool, &user.0).await?;
    Ok(Json(resp))
}
