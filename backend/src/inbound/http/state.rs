//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CredentialService, OfferEngine, UserDirectory, WishLedger, WishlistCurator,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use wishlist_backend::domain::ports::{
///     CredentialService, OfferEngine, UserDirectory, WishLedger, WishlistCurator,
/// };
/// use wishlist_backend::inbound::http::state::HttpState;
///
/// fn build(
///     credentials: Arc<dyn CredentialService>,
///     users: Arc<dyn UserDirectory>,
///     wishes: Arc<dyn WishLedger>,
///     offers: Arc<dyn OfferEngine>,
///     wishlists: Arc<dyn WishlistCurator>,
/// ) -> HttpState {
///     HttpState {
///         credentials,
///         users,
///         wishes,
///         offers,
///         wishlists,
///     }
/// }
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub credentials: Arc<dyn CredentialService>,
    pub users: Arc<dyn UserDirectory>,
    pub wishes: Arc<dyn WishLedger>,
    pub offers: Arc<dyn OfferEngine>,
    pub wishlists: Arc<dyn WishlistCurator>,
}
