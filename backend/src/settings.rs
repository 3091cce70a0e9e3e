//! Runtime configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `WISHLIST_*` environment variables and an
//! optional configuration file. Scalars carry their defaults in the derive;
//! only the database URL and the CORS allow-list are genuinely optional.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::RetryPolicy;
use crate::middleware::CorsPolicy;
use crate::outbound::persistence::PoolConfig;

pub const DEFAULT_JWT_SECRET: &str = "secretKey";

/// Invalid configuration values detected after loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("bind address `{value}` is not a socket address")]
    InvalidBindAddr { value: String },
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WISHLIST")]
pub struct WishlistSettings {
    /// Socket address the HTTP server binds to.
    #[ortho_config(default = "0.0.0.0:3000".to_owned())]
    pub bind_addr: String,
    /// PostgreSQL URL. Without it the server keeps data in process memory.
    pub database_url: Option<String>,
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Seconds to wait for a pooled connection before giving up.
    #[ortho_config(default = 30)]
    pub db_connection_timeout_secs: u64,
    /// HMAC secret for access tokens.
    #[ortho_config(default = DEFAULT_JWT_SECRET.to_owned())]
    pub jwt_secret: String,
    #[ortho_config(default = 3600)]
    pub jwt_expiry_secs: u64,
    /// Argon2 memory cost in KiB.
    #[ortho_config(default = 19_456)]
    pub hash_memory_kib: u32,
    /// Argon2 iteration count.
    #[ortho_config(default = 2)]
    pub hash_time_cost: u32,
    /// Attempts for offer and copy writes that lose a revision race.
    #[ortho_config(default = 5)]
    pub offer_retry_attempts: u32,
    #[ortho_config(default = 10)]
    pub offer_retry_initial_backoff_ms: u64,
    #[ortho_config(default = 200)]
    pub offer_retry_max_backoff_ms: u64,
    /// Comma-separated browser origins allowed to call the API. Any origin
    /// when unset.
    pub cors_allowed_origins: Option<String>,
}

impl WishlistSettings {
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] for unparsable values.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .parse()
            .map_err(|_| SettingsError::InvalidBindAddr {
                value: self.bind_addr.clone(),
            })
    }

    /// Pool settings when a database URL is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?;
        Some(
            PoolConfig::new(url)
                .with_max_size(self.db_max_connections)
                .with_connection_timeout(Duration::from_secs(self.db_connection_timeout_secs)),
        )
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// True when tokens would be signed with the well-known default secret.
    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn jwt_lifetime(&self) -> TimeDelta {
        i64::try_from(self.jwt_expiry_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    pub fn hash_memory_kib(&self) -> u32 {
        self.hash_memory_kib
    }

    pub fn hash_time_cost(&self) -> u32 {
        self.hash_time_cost
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.offer_retry_attempts,
            initial_backoff: Duration::from_millis(self.offer_retry_initial_backoff_ms),
            max_backoff: Duration::from_millis(self.offer_retry_max_backoff_ms),
        }
    }

    /// Blank entries in the allow-list are ignored; an empty list means any
    /// origin.
    pub fn cors_policy(&self) -> CorsPolicy {
        let origins = self
            .cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if origins.is_empty() {
            CorsPolicy::any_origin()
        } else {
            CorsPolicy::allow_list(origins)
        }
    }
}
