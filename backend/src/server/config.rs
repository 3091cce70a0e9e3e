//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use chrono::TimeDelta;
use zeroize::Zeroizing;

use wishlist_backend::domain::RetryPolicy;
use wishlist_backend::middleware::CorsPolicy;
use wishlist_backend::outbound::persistence::DbPool;

/// Token signing and password hashing parameters.
#[derive(Clone)]
pub struct CredentialConfig {
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) jwt_lifetime: TimeDelta,
    pub(crate) hash_memory_kib: u32,
    pub(crate) hash_time_cost: u32,
}

impl CredentialConfig {
    #[must_use]
    pub fn new(jwt_secret: &str, jwt_lifetime: TimeDelta) -> Self {
        Self {
            jwt_secret: Zeroizing::new(jwt_secret.as_bytes().to_vec()),
            jwt_lifetime,
            hash_memory_kib: 19_456,
            hash_time_cost: 2,
        }
    }

    /// Override the Argon2 memory (KiB) and iteration costs.
    #[must_use]
    pub fn with_hash_costs(mut self, memory_kib: u32, time_cost: u32) -> Self {
        self.hash_memory_kib = memory_kib;
        self.hash_time_cost = time_cost;
        self
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) credentials: CredentialConfig,
    pub(crate) retry_policy: RetryPolicy,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) cors: CorsPolicy,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, credentials: CredentialConfig) -> Self {
        Self {
            bind_addr,
            credentials,
            retry_policy: RetryPolicy::default(),
            db_pool: None,
            cors: CorsPolicy::any_origin(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one every port is served by the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Retry limits for offer and copy writes that lose a revision race.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Browser origins allowed to call the API. Any origin by default.
    #[must_use]
    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
