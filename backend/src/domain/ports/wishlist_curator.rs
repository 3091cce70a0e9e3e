//! Driving port for wishlist CRUD.

use async_trait::async_trait;

use crate::domain::{Error, UserId, WishlistDetails, WishlistDraft, WishlistId, WishlistPatch};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WishlistCurator: Send + Sync {
    async fn list(&self, owner_id: UserId) -> Result<Vec<WishlistDetails>, Error>;

    async fn get(&self, id: WishlistId) -> Result<WishlistDetails, Error>;

    /// Item ids that do not resolve to a wish are dropped.
    async fn create(&self, owner_id: UserId, draft: WishlistDraft)
    -> Result<WishlistDetails, Error>;

    async fn update(
        &self,
        actor: UserId,
        id: WishlistId,
        patch: WishlistPatch,
    ) -> Result<WishlistDetails, Error>;

    async fn delete(&self, actor: UserId, id: WishlistId) -> Result<(), Error>;
}
