//! API server configuration.

use haven_core::auth::jwt::resolve_jwt_secret;
use haven_core::auth::password::DEFAULT_BCRYPT_COST;

/// Default refresh token lifetime in days.
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 30;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Refresh token lifetime in days.
    pub refresh_token_ttl_days: i64,
    /// bcrypt cost factor for password hashing.
    pub bcrypt_cost: u32,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                     | Default                          |
    /// |------------------------------|----------------------------------|
    /// | `BIND_ADDR`                  | `127.0.0.1:3000`                 |
    /// | `DATABASE_URL`               | `postgres://localhost:5432/haven`|
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file    |
    /// | `REFRESH_TOKEN_TTL_DAYS`     | `30`                             |
    /// | `BCRYPT_COST`                | `10`                             |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/haven".into()),
            jwt_secret: resolve_jwt_secret(),
            refresh_token_ttl_days: env_parse("REFRESH_TOKEN_TTL_DAYS")
                .unwrap_or(DEFAULT_REFRESH_TOKEN_TTL_DAYS),
            bcrypt_cost: env_parse("BCRYPT_COST").unwrap_or(DEFAULT_BCRYPT_COST),
        }
    }
}

/// Parse an environment variable, ignoring unset or malformed values.
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
