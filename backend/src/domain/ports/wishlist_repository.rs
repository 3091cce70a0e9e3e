//! Port for wishlist persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewWishlist, UserId, Wishlist, WishlistId, WishlistPatch};

use super::define_port_error;

define_port_error! {
    /// Errors raised by wishlist repository adapters.
    pub enum WishlistRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "wishlist repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "wishlist repository query failed: {message}",
    }
}

/// Port for wishlist storage. Item sets are replaced wholesale.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    async fn list_by_owner(&self, owner_id: UserId)
    -> Result<Vec<Wishlist>, WishlistRepositoryError>;

    async fn find_by_id(&self, id: WishlistId)
    -> Result<Option<Wishlist>, WishlistRepositoryError>;

    async fn insert(&self, wishlist: NewWishlist) -> Result<Wishlist, WishlistRepositoryError>;

    /// Apply `patch`. Returns `None` for unknown ids.
    async fn update(
        &self,
        id: WishlistId,
        patch: WishlistPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Wishlist>, WishlistRepositoryError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: WishlistId) -> Result<bool, WishlistRepositoryError>;
}
