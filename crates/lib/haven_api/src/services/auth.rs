//! Authentication service — credential validation, token issuance,
//! rotation, and revocation, delegating primitives to `haven_core::auth`.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use haven_core::auth::jwt::generate_access_token;
use haven_core::auth::password::{hash_password, verify_password};
use haven_core::auth::queries;
use haven_core::auth::tokens::{generate_refresh_token, hash_refresh_token};
use haven_core::models::auth::{TokenClaims, UserRole, UserRow};

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    RefreshTokenInfo, RegisterRequest, RevokeAllResponse, RevokeTokenResponse, TokenPairResponse,
    UserInfo,
};

/// Validate email + password against the user store.
///
/// Unknown email and wrong password yield the same Unauthorized message
/// so the response does not reveal which one failed.
pub async fn validate_user(pool: &PgPool, email: &str, password: &str) -> AppResult<UserRow> {
    let user = queries::find_user_by_email(pool, email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    Ok(user)
}

/// Sign an access token and persist a fresh refresh token for `user`,
/// bound to the issuing IP.
async fn issue_token_pair(
    pool: &PgPool,
    config: &ApiConfig,
    user: UserRow,
    client_ip: &str,
) -> AppResult<TokenPairResponse> {
    let access_token = generate_access_token(
        &user.id.to_string(),
        &user.email,
        config.jwt_secret.as_bytes(),
    )?;

    let refresh_token = generate_refresh_token();
    let token_hash = hash_refresh_token(&refresh_token);
    let expires_at = Utc::now() + Duration::days(config.refresh_token_ttl_days);

    let record =
        queries::store_refresh_token(pool, &token_hash, &user.id, expires_at, client_ip).await?;

    Ok(TokenPairResponse {
        user: user.into(),
        access_token,
        refresh_token: RefreshTokenInfo {
            token: refresh_token,
            expires: record.expires_at,
        },
    })
}

/// Authenticate with email + password, returning a token pair.
pub async fn login(
    pool: &PgPool,
    config: &ApiConfig,
    email: &str,
    password: &str,
    client_ip: &str,
) -> AppResult<TokenPairResponse> {
    let user = validate_user(pool, email, password).await?;
    issue_token_pair(pool, config, user, client_ip).await
}

/// Register a new user account and issue its initial token pair.
///
/// Only an OWNER actor may assign an elevated role or permission lists;
/// any other actor (including anonymous) produces an EDITOR with all
/// permission lists cleared, regardless of request input. The first user
/// ever registered is promoted to OWNER.
pub async fn register(
    pool: &PgPool,
    config: &ApiConfig,
    body: RegisterRequest,
    actor: Option<&TokenClaims>,
    client_ip: &str,
) -> AppResult<TokenPairResponse> {
    if body.email.is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }
    if body.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    if queries::email_exists(pool, &body.email).await? {
        return Err(AppError::Validation("Email already registered".into()));
    }

    let actor_row = match actor {
        Some(claims) => resolve_actor(pool, claims).await.ok(),
        None => None,
    };
    let actor_is_owner = actor_row.as_ref().is_some_and(UserRow::is_owner);
    let is_first_user = queries::user_count(pool).await? == 0;

    let (role, locations, resources, categories) = if actor_is_owner {
        (
            body.role.unwrap_or(UserRole::Editor),
            body.editable_locations.unwrap_or_default(),
            body.editable_resources.unwrap_or_default(),
            body.editable_categories.unwrap_or_default(),
        )
    } else {
        // Elevated fields stripped; permission lists cleared.
        (UserRole::Editor, Vec::new(), Vec::new(), Vec::new())
    };

    // Bootstrap: the first user becomes OWNER (lists stay cleared —
    // OWNER bypasses them anyway).
    let role = if is_first_user { UserRole::Owner } else { role };

    let pw_hash = hash_password(&body.password, config.bcrypt_cost)?;

    let user = queries::create_user(
        pool,
        &body.email,
        body.name.as_deref(),
        &pw_hash,
        role,
        &locations,
        &resources,
        &categories,
    )
    .await?;

    if is_first_user {
        info!(email = %user.email, "first user granted owner role");
    }

    // The token pair belongs to the newly created user, not the actor.
    issue_token_pair(pool, config, user, client_ip).await
}

/// Exchange a refresh token for a new token pair (single-use rotation).
///
/// The spent token is revoked with a back-reference to its successor,
/// extending the audit chain. Two concurrent refreshes of one token can
/// both observe it active and fork the chain; consistency relies on
/// per-row atomicity only.
pub async fn refresh(
    pool: &PgPool,
    config: &ApiConfig,
    refresh_token: &str,
    client_ip: &str,
) -> AppResult<TokenPairResponse> {
    if refresh_token.is_empty() {
        return Err(AppError::Validation("Refresh token is required".into()));
    }

    let token_hash = hash_refresh_token(refresh_token);
    let old = queries::find_refresh_token(pool, &token_hash).await?;

    let old = match old {
        Some(t) if t.is_active(Utc::now()) => t,
        _ => return Err(AppError::Unauthorized("Refresh token is revoked".into())),
    };

    let user = queries::get_user_by_id(pool, &old.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    // Persist the successor, then stamp the old token revoked with the
    // back-reference.
    let new_plaintext = generate_refresh_token();
    let new_hash = hash_refresh_token(&new_plaintext);
    let expires_at = Utc::now() + Duration::days(config.refresh_token_ttl_days);

    let successor =
        queries::store_refresh_token(pool, &new_hash, &user.id, expires_at, client_ip).await?;
    queries::mark_refresh_token_replaced(pool, &old.id, client_ip, &successor.token_hash).await?;

    let access_token = generate_access_token(
        &user.id.to_string(),
        &user.email,
        config.jwt_secret.as_bytes(),
    )?;

    Ok(TokenPairResponse {
        user: user.into(),
        access_token,
        refresh_token: RefreshTokenInfo {
            token: new_plaintext,
            expires: successor.expires_at,
        },
    })
}

/// Revoke a single refresh token.
///
/// An unknown or already-inactive token signals "already revoked" (304)
/// with no mutation; this check deliberately runs before the ownership
/// check. Users revoke their own tokens, OWNER revokes any.
pub async fn revoke_token(
    pool: &PgPool,
    refresh_token: &str,
    actor: &TokenClaims,
    client_ip: &str,
) -> AppResult<RevokeTokenResponse> {
    if refresh_token.is_empty() {
        return Err(AppError::Validation("Token is required".into()));
    }

    let token_hash = hash_refresh_token(refresh_token);
    let token = queries::find_refresh_token(pool, &token_hash).await?;

    let token = match token {
        Some(t) if t.is_active(Utc::now()) => t,
        _ => return Err(AppError::AlreadyRevoked),
    };

    let actor_row = resolve_actor(pool, actor).await?;
    if token.user_id != actor_row.id && !actor_row.is_owner() {
        return Err(AppError::Unauthorized(
            "Cannot revoke another user's token".into(),
        ));
    }

    queries::revoke_refresh_token(pool, &token.id, client_ip).await?;

    Ok(RevokeTokenResponse { success: true })
}

/// Bulk-revoke all active refresh tokens for a user.
///
/// Only the target user themselves or an OWNER may do this; otherwise
/// the store is left untouched.
pub async fn revoke_all(
    pool: &PgPool,
    target_user_id: &Uuid,
    actor: &TokenClaims,
    client_ip: &str,
) -> AppResult<RevokeAllResponse> {
    let actor_row = resolve_actor(pool, actor).await?;
    if actor_row.id != *target_user_id && !actor_row.is_owner() {
        return Err(AppError::Unauthorized(
            "Cannot revoke another user's tokens".into(),
        ));
    }

    let revoked = queries::revoke_all_refresh_tokens(pool, target_user_id, client_ip).await?;

    Ok(RevokeAllResponse { revoked })
}

/// Load the authenticated user for `GET /api/auth/me`.
pub async fn current_user(pool: &PgPool, claims: &TokenClaims) -> AppResult<UserInfo> {
    let user = resolve_actor(pool, claims).await?;
    Ok(user.into())
}

/// Resolve token claims to the acting user's row. Role and permission
/// checks read the store, not the token, so demotions apply immediately.
pub async fn resolve_actor(pool: &PgPool, claims: &TokenClaims) -> AppResult<UserRow> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token subject".into()))?;
    queries::get_user_by_id(pool, &user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}
