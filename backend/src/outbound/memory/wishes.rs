use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{WishRepository, WishRepositoryError};
use crate::domain::{Money, NewWish, UserId, Wish, WishId, WishPatch};

use super::{MemoryStore, Tables};

fn lock_error(message: &'static str) -> WishRepositoryError {
    WishRepositoryError::connection(message)
}

fn has_copy(tables: &Tables, owner_id: UserId, source_id: WishId) -> bool {
    tables
        .wishes
        .values()
        .any(|wish| wish.owner_id == owner_id && wish.original_wish_id == Some(source_id))
}

fn insert_row(tables: &mut Tables, wish: NewWish) -> Wish {
    let id = tables.wish_ids.next();
    let stored = Wish {
        id: WishId::new(id),
        name: wish.name,
        link: wish.link,
        image: wish.image,
        description: wish.description,
        price: wish.price,
        raised: Money::ZERO,
        copied: 0,
        owner_id: wish.owner_id,
        original_wish_id: wish.original_wish_id,
        created_at: wish.created_at,
        updated_at: wish.created_at,
        revision: 0,
    };
    tables.wishes.insert(id, stored.clone());
    stored
}

fn duplicate_copy() -> WishRepositoryError {
    WishRepositoryError::duplicate_copy("wishes_owner_original_key")
}

#[async_trait]
impl WishRepository for MemoryStore {
    async fn find_by_id(&self, id: WishId) -> Result<Option<Wish>, WishRepositoryError> {
        let tables = self.lock(lock_error)?;
        Ok(tables.wishes.get(&id.get()).cloned())
    }

    async fn find_by_ids(&self, ids: &[WishId]) -> Result<Vec<Wish>, WishRepositoryError> {
        let tables = self.lock(lock_error)?;
        let mut seen = Vec::with_capacity(ids.len());
        Ok(ids
            .iter()
            .filter(|id| {
                let fresh = !seen.contains(*id);
                seen.push(**id);
                fresh
            })
            .filter_map(|id| tables.wishes.get(&id.get()).cloned())
            .collect())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Wish>, WishRepositoryError> {
        let tables = self.lock(lock_error)?;
        let mut wishes: Vec<Wish> = tables.wishes.values().cloned().collect();
        wishes.sort_by_key(|wish| Reverse((wish.created_at, wish.id)));
        wishes.truncate(limit);
        Ok(wishes)
    }

    async fn list_top(&self, limit: usize) -> Result<Vec<Wish>, WishRepositoryError> {
        let tables = self.lock(lock_error)?;
        let mut wishes: Vec<Wish> = tables.wishes.values().cloned().collect();
        wishes.sort_by_key(|wish| (Reverse(wish.copied), wish.id));
        wishes.truncate(limit);
        Ok(wishes)
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Wish>, WishRepositoryError> {
        let tables = self.lock(lock_error)?;
        Ok(tables
            .wishes
            .values()
            .filter(|wish| wish.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_copy(
        &self,
        owner_id: UserId,
        source_id: WishId,
    ) -> Result<Option<Wish>, WishRepositoryError> {
        let tables = self.lock(lock_error)?;
        Ok(tables
            .wishes
            .values()
            .find(|wish| wish.owner_id == owner_id && wish.original_wish_id == Some(source_id))
            .cloned())
    }

    async fn insert(&self, wish: NewWish) -> Result<Wish, WishRepositoryError> {
        let mut tables = self.lock(lock_error)?;
        let copies_existing = wish
            .original_wish_id
            .is_some_and(|source| has_copy(&tables, wish.owner_id, source));
        if copies_existing {
            return Err(duplicate_copy());
        }
        Ok(insert_row(&mut tables, wish))
    }

    async fn update(
        &self,
        id: WishId,
        patch: WishPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Wish>, WishRepositoryError> {
        let mut tables = self.lock(lock_error)?;
        let Some(wish) = tables.wishes.get_mut(&id.get()) else {
            return Ok(None);
        };
        if !patch.keeps_funding_bounds(wish) {
            return Err(WishRepositoryError::funding_bounds(id.get()));
        }
        patch.apply(wish);
        wish.updated_at = now;
        wish.revision = wish.revision.wrapping_add(1);
        Ok(Some(wish.clone()))
    }

    async fn delete(&self, id: WishId) -> Result<bool, WishRepositoryError> {
        let mut tables = self.lock(lock_error)?;
        if tables.wishes.remove(&id.get()).is_none() {
            return Ok(false);
        }
        tables.offers.retain(|_, offer| offer.item_id != id);
        for wishlist in tables.wishlists.values_mut() {
            wishlist.item_ids.retain(|item| *item != id);
        }
        for wish in tables.wishes.values_mut() {
            if wish.original_wish_id == Some(id) {
                wish.original_wish_id = None;
            }
        }
        Ok(true)
    }

    async fn record_copy(
        &self,
        source_id: WishId,
        expected_revision: u32,
        copy: NewWish,
    ) -> Result<Wish, WishRepositoryError> {
        let mut tables = self.lock(lock_error)?;
        let actual = tables
            .wishes
            .get(&source_id.get())
            .map(|source| source.revision)
            .ok_or_else(|| WishRepositoryError::not_found(source_id.get()))?;
        if actual != expected_revision {
            return Err(WishRepositoryError::revision_mismatch(
                expected_revision,
                actual,
            ));
        }
        if has_copy(&tables, copy.owner_id, source_id) {
            return Err(duplicate_copy());
        }

        if let Some(source) = tables.wishes.get_mut(&source_id.get()) {
            source.copied = source.copied.saturating_add(1);
            source.revision = source.revision.wrapping_add(1);
        }
        Ok(insert_row(&mut tables, copy))
    }
}
