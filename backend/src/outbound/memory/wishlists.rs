use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{WishlistRepository, WishlistRepositoryError};
use crate::domain::{NewWishlist, UserId, Wishlist, WishlistId, WishlistPatch};

use super::MemoryStore;

fn lock_error(message: &'static str) -> WishlistRepositoryError {
    WishlistRepositoryError::connection(message)
}

#[async_trait]
impl WishlistRepository for MemoryStore {
    async fn list_by_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Vec<Wishlist>, WishlistRepositoryError> {
        let tables = self.lock(lock_error)?;
        Ok(tables
            .wishlists
            .values()
            .filter(|wishlist| wishlist.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        id: WishlistId,
    ) -> Result<Option<Wishlist>, WishlistRepositoryError> {
        let tables = self.lock(lock_error)?;
        Ok(tables.wishlists.get(&id.get()).cloned())
    }

    async fn insert(&self, wishlist: NewWishlist) -> Result<Wishlist, WishlistRepositoryError> {
        let mut tables = self.lock(lock_error)?;
        let id = tables.wishlist_ids.next();
        let stored = Wishlist {
            id: WishlistId::new(id),
            name: wishlist.name,
            description: wishlist.description,
            image: wishlist.image,
            owner_id: wishlist.owner_id,
            item_ids: wishlist.item_ids,
            created_at: wishlist.created_at,
            updated_at: wishlist.created_at,
        };
        tables.wishlists.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: WishlistId,
        patch: WishlistPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Wishlist>, WishlistRepositoryError> {
        let mut tables = self.lock(lock_error)?;
        let Some(wishlist) = tables.wishlists.get_mut(&id.get()) else {
            return Ok(None);
        };
        patch.apply(wishlist);
        wishlist.updated_at = now;
        Ok(Some(wishlist.clone()))
    }

    async fn delete(&self, id: WishlistId) -> Result<bool, WishlistRepositoryError> {
        let mut tables = self.lock(lock_error)?;
        Ok(tables.wishlists.remove(&id.get()).is_some())
    }
}
