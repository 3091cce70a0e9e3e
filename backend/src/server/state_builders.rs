//! Builders for the HTTP state: repositories, credential adapters and the
//! domain services implementing each driving port.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use wishlist_backend::domain::ports::{
    OfferRepository, PasswordHasher, TokenIssuer, UserRepository, WishRepository,
    WishlistRepository,
};
use wishlist_backend::domain::{
    ConflictRetry, CredentialServiceImpl, OfferEngineService, TokioSleeper, UserDirectoryService,
    WishLedgerService, WishlistCuratorService,
};
use wishlist_backend::inbound::http::state::HttpState;
use wishlist_backend::outbound::memory::MemoryStore;
use wishlist_backend::outbound::persistence::{
    DbPool, DieselOfferRepository, DieselUserRepository, DieselWishRepository,
    DieselWishlistRepository,
};
use wishlist_backend::outbound::security::{Argon2PasswordHasher, JwtTokenIssuer};

use super::ServerConfig;

/// Collaborators shared by every service regardless of the storage backend.
#[derive(Clone)]
struct ServiceDeps {
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    clock: Arc<dyn Clock>,
    retry: ConflictRetry,
}

impl ServiceDeps {
    fn from_config(config: &ServerConfig) -> std::io::Result<Self> {
        let credentials = &config.credentials;
        let hasher = Argon2PasswordHasher::new(
            credentials.hash_memory_kib,
            credentials.hash_time_cost,
        )
        .map_err(|err| std::io::Error::other(format!("invalid password hash costs: {err}")))?;
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let tokens = JwtTokenIssuer::new(
            credentials.jwt_secret.as_slice(),
            credentials.jwt_lifetime,
            clock.clone(),
        );
        Ok(Self {
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
            clock,
            retry: ConflictRetry::new(config.retry_policy, Arc::new(TokioSleeper)),
        })
    }
}

/// Wire the five driving-port services over one set of repositories.
fn build_services<U, W, O, L>(
    users: Arc<U>,
    wishes: Arc<W>,
    offers: Arc<O>,
    wishlists: Arc<L>,
    deps: ServiceDeps,
) -> HttpState
where
    U: UserRepository + 'static,
    W: WishRepository + 'static,
    O: OfferRepository + 'static,
    L: WishlistRepository + 'static,
{
    let ServiceDeps {
        hasher,
        tokens,
        clock,
        retry,
    } = deps;

    HttpState {
        credentials: Arc::new(CredentialServiceImpl::new(
            users.clone(),
            hasher.clone(),
            tokens,
            clock.clone(),
        )),
        users: Arc::new(UserDirectoryService::new(
            users.clone(),
            wishes.clone(),
            hasher,
            clock.clone(),
        )),
        wishes: Arc::new(WishLedgerService::new(
            wishes.clone(),
            offers.clone(),
            users.clone(),
            clock.clone(),
            retry.clone(),
        )),
        offers: Arc::new(OfferEngineService::new(
            offers,
            wishes.clone(),
            users.clone(),
            clock.clone(),
            retry,
        )),
        wishlists: Arc::new(WishlistCuratorService::new(wishlists, wishes, users, clock)),
    }
}

fn build_with_pool(pool: &DbPool, deps: ServiceDeps) -> HttpState {
    build_services(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselWishRepository::new(pool.clone())),
        Arc::new(DieselOfferRepository::new(pool.clone())),
        Arc::new(DieselWishlistRepository::new(pool.clone())),
        deps,
    )
}

fn build_in_memory(deps: ServiceDeps) -> HttpState {
    let store = Arc::new(MemoryStore::new());
    build_services(store.clone(), store.clone(), store.clone(), store, deps)
}

/// Build the shared HTTP state, backed by PostgreSQL when a pool is
/// configured and by the in-memory store otherwise.
///
/// # Errors
///
/// Returns an I/O error when the password hashing costs are rejected.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let deps = ServiceDeps::from_config(config)?;
    let state = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL persistence");
            build_with_pool(pool, deps)
        }
        None => {
            warn!("no database configured; data is kept in memory and lost on restart");
            build_in_memory(deps)
        }
    };
    Ok(web::Data::new(state))
}
