//! Auth-related database queries.
//!
//! All operations are single-shot against the store: no transactions,
//! no retries, no in-memory token caching. Consistency relies on
//! per-row atomicity only.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{RefreshTokenRow, UserRole, UserRow};
use crate::uuid::uuidv7;

const USER_COLUMNS: &str = "id, email, name, password_hash, role, \
     editable_locations, editable_resources, editable_categories, created_at";

const TOKEN_COLUMNS: &str = "id, user_id, token_hash, created_at, created_by_ip, \
     expires_at, revoked_at, revoked_by_ip, replaced_by_token_hash";

/// Fetch a user by email.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a user by ID.
pub async fn get_user_by_id(pool: &PgPool, user_id: &Uuid) -> Result<Option<UserRow>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Check whether an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AuthError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Count total users.
pub async fn user_count(pool: &PgPool) -> Result<i64, AuthError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Create a new user, returning the persisted row.
#[allow(clippy::too_many_arguments)]
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    name: Option<&str>,
    password_hash: &str,
    role: UserRole,
    editable_locations: &[Uuid],
    editable_resources: &[Uuid],
    editable_categories: &[Uuid],
) -> Result<UserRow, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users \
             (email, name, password_hash, role, \
              editable_locations, editable_resources, editable_categories) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(role)
    .bind(editable_locations)
    .bind(editable_resources)
    .bind(editable_categories)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Store a new refresh token hash, returning the persisted row.
pub async fn store_refresh_token(
    pool: &PgPool,
    token_hash: &str,
    user_id: &Uuid,
    expires_at: DateTime<Utc>,
    created_by_ip: &str,
) -> Result<RefreshTokenRow, AuthError> {
    let row = sqlx::query_as::<_, RefreshTokenRow>(&format!(
        "INSERT INTO refresh_tokens (id, token_hash, user_id, expires_at, created_by_ip) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {TOKEN_COLUMNS}"
    ))
    .bind(uuidv7())
    .bind(token_hash)
    .bind(user_id)
    .bind(expires_at)
    .bind(created_by_ip)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Look up a refresh token by hash, active or not.
///
/// Callers distinguish missing/inactive/active themselves: the revoke
/// flow signals "already revoked" for inactive tokens while the refresh
/// flow treats them as unauthorized.
pub async fn find_refresh_token(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<RefreshTokenRow>, AuthError> {
    let row = sqlx::query_as::<_, RefreshTokenRow>(&format!(
        "SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE token_hash = $1"
    ))
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Revoke a refresh token, stamping the revocation time and IP.
pub async fn revoke_refresh_token(
    pool: &PgPool,
    token_id: &Uuid,
    revoked_by_ip: &str,
) -> Result<(), AuthError> {
    sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = now(), revoked_by_ip = $2 \
         WHERE id = $1 AND revoked_at IS NULL",
    )
    .bind(token_id)
    .bind(revoked_by_ip)
    .execute(pool)
    .await?;
    Ok(())
}

/// Mark a refresh token as replaced by its rotation successor.
///
/// Stamps revocation metadata and the back-reference to the successor's
/// hash, closing one link of the audit chain.
pub async fn mark_refresh_token_replaced(
    pool: &PgPool,
    token_id: &Uuid,
    revoked_by_ip: &str,
    successor_hash: &str,
) -> Result<(), AuthError> {
    sqlx::query(
        "UPDATE refresh_tokens \
         SET revoked_at = now(), revoked_by_ip = $2, replaced_by_token_hash = $3 \
         WHERE id = $1 AND revoked_at IS NULL",
    )
    .bind(token_id)
    .bind(revoked_by_ip)
    .bind(successor_hash)
    .execute(pool)
    .await?;
    Ok(())
}

/// Revoke all currently-active refresh tokens for a user, returning the
/// number revoked. Expired-but-unrevoked rows are left unstamped.
pub async fn revoke_all_refresh_tokens(
    pool: &PgPool,
    user_id: &Uuid,
    revoked_by_ip: &str,
) -> Result<u64, AuthError> {
    let result = sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = now(), revoked_by_ip = $2 \
         WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > now()",
    )
    .bind(user_id)
    .bind(revoked_by_ip)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
