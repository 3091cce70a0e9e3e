//! Driving port for wish management and copying.

use async_trait::async_trait;

use crate::domain::{Error, UserId, Wish, WishDetails, WishDraft, WishId, WishPatch};

/// Wish use-cases. The acting user is always an explicit argument.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WishLedger: Send + Sync {
    /// Create an unfunded wish owned by `owner_id`.
    async fn create_wish(&self, owner_id: UserId, draft: WishDraft) -> Result<Wish, Error>;

    /// Wish with owner and offers (contributors resolved).
    async fn get_wish(&self, id: WishId) -> Result<WishDetails, Error>;

    async fn list_recent(&self) -> Result<Vec<Wish>, Error>;

    async fn list_top(&self) -> Result<Vec<Wish>, Error>;

    /// Owner-only partial update.
    async fn update_wish(&self, actor: UserId, id: WishId, patch: WishPatch)
    -> Result<Wish, Error>;

    /// Owner-only delete, cascading to offers.
    async fn delete_wish(&self, actor: UserId, id: WishId) -> Result<(), Error>;

    /// Copy another user's wish into `actor`'s list, at most once per source.
    async fn copy_wish(&self, actor: UserId, id: WishId) -> Result<Wish, Error>;
}
