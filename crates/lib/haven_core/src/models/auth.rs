//! Authentication domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role. OWNER may assign elevated permissions; EDITOR edits only
/// the entities listed in their permission arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Owner,
    Editor,
}

/// User row as stored in the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
    /// Location IDs this user may edit.
    pub editable_locations: Vec<Uuid>,
    /// Resource IDs this user may edit.
    pub editable_resources: Vec<Uuid>,
    /// Category IDs this user may edit.
    pub editable_categories: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn is_owner(&self) -> bool {
        self.role == UserRole::Owner
    }
}

/// Refresh token row as stored in the `refresh_tokens` table.
///
/// Only the SHA-256 hash of the token is persisted; the plaintext is
/// returned to the client once at issuance. Revocation metadata and the
/// `replaced_by_token_hash` back-reference form the rotation audit chain.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub created_by_ip: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by_ip: Option<String>,
    pub replaced_by_token_hash: Option<String>,
}

impl RefreshTokenRow {
    /// A token is active iff it has not expired and has not been revoked.
    /// Once revoked or replaced it never reactivates.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — user ID (standard JWT `sub` claim).
    pub sub: String,
    /// User email as of issuance.
    pub email: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_at: DateTime<Utc>, revoked_at: Option<DateTime<Utc>>) -> RefreshTokenRow {
        RefreshTokenRow {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            token_hash: "abc".into(),
            created_at: Utc::now(),
            created_by_ip: None,
            expires_at,
            revoked_at,
            revoked_by_ip: None,
            replaced_by_token_hash: None,
        }
    }

    #[test]
    fn active_iff_unexpired_and_unrevoked() {
        let now = Utc::now();
        assert!(token(now + Duration::days(1), None).is_active(now));
        assert!(!token(now - Duration::seconds(1), None).is_active(now));
        assert!(!token(now + Duration::days(1), Some(now)).is_active(now));
        assert!(!token(now - Duration::days(1), Some(now)).is_active(now));
    }
}
