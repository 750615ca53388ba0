//! API request and response models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use haven_core::directory::{CategoryRow, LocationRow, ResourceRow};
use haven_core::models::auth::{UserRole, UserRow};

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration payload. Role and permission lists are honored only when
/// the requesting user has the OWNER role; otherwise they are stripped.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub editable_locations: Option<Vec<Uuid>>,
    #[serde(default)]
    pub editable_resources: Option<Vec<Uuid>>,
    #[serde(default)]
    pub editable_categories: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevokeTokenRequest {
    #[serde(default)]
    pub token: String,
}

/// User as exposed over the API (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub editable_locations: Vec<Uuid>,
    pub editable_resources: Vec<Uuid>,
    pub editable_categories: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserInfo {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            role: row.role,
            editable_locations: row.editable_locations,
            editable_resources: row.editable_resources,
            editable_categories: row.editable_categories,
            created_at: row.created_at,
        }
    }
}

/// Refresh token as returned to the client: plaintext plus expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenInfo {
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// Response for login, register, and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub user: UserInfo,
    pub access_token: String,
    pub refresh_token: RefreshTokenInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeTokenResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeAllResponse {
    /// Number of tokens revoked.
    pub revoked: u64,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Query flags controlling whether referenced sub-entities are expanded
/// into full objects or left as bare IDs.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ExpandQuery {
    #[serde(default)]
    pub locations: bool,
    #[serde(default)]
    pub categories: bool,
}

/// A location reference: bare ID, or the full object when expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationRef {
    Id(Uuid),
    Full(LocationInfo),
}

/// A category reference: bare ID, or the full object when expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(Uuid),
    Full(CategoryInfo),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationInfo {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<LocationRow> for LocationInfo {
    fn from(row: LocationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            city: row.city,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<CategoryRow> for CategoryInfo {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Resource as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub locations: Vec<LocationRef>,
    pub categories: Vec<CategoryRef>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceView {
    /// Build a view with bare ID references (no expansion).
    pub fn bare(row: ResourceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            website: row.website,
            locations: row.location_ids.into_iter().map(LocationRef::Id).collect(),
            categories: row.category_ids.into_iter().map(CategoryRef::Id).collect(),
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `name` is required but modelled as optional so a missing field maps
/// to a 400 validation error rather than a body-deserialization reject.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResourceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub category_ids: Option<Vec<Uuid>>,
}

/// Partial update: absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateResourceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub category_ids: Option<Vec<Uuid>>,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub db_connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_ref_serializes_untagged() {
        let id = Uuid::now_v7();
        let bare = serde_json::to_value(LocationRef::Id(id)).unwrap();
        assert_eq!(bare, serde_json::Value::String(id.to_string()));

        let full = serde_json::to_value(LocationRef::Full(LocationInfo {
            id,
            name: "Community Center".into(),
            address: None,
            city: Some("Springfield".into()),
            created_at: Utc::now(),
        }))
        .unwrap();
        assert_eq!(full["name"], "Community Center");
    }

    #[test]
    fn expand_query_defaults_to_bare_ids() {
        let q: ExpandQuery = serde_json::from_str("{}").unwrap();
        assert!(!q.locations);
        assert!(!q.categories);
    }

    #[test]
    fn user_role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(UserRole::Owner).unwrap(), "owner");
        assert_eq!(serde_json::to_value(UserRole::Editor).unwrap(), "editor");
    }
}
