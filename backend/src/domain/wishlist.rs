//! Named, user-owned collections of wishes.

use chrono::{DateTime, Utc};

use super::{User, UserId, Wish, WishId, WishlistId};

/// Stored wishlist. `item_ids` holds each wish at most once, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wishlist {
    pub id: WishlistId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub owner_id: UserId,
    pub item_ids: Vec<WishId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated creation payload; `item_ids` may reference missing wishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistDraft {
    pub name: String,
    pub description: String,
    pub image: String,
    pub item_ids: Vec<WishId>,
}

/// Insert payload with items already resolved against the wish store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWishlist {
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub item_ids: Vec<WishId>,
    pub created_at: DateTime<Utc>,
}

/// Partial update. `item_ids`, when present, replaces the whole item set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishlistPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub item_ids: Option<Vec<WishId>>,
}

impl WishlistPatch {
    /// Apply the present fields to `wishlist`.
    pub fn apply(&self, wishlist: &mut Wishlist) {
        if let Some(name) = &self.name {
            wishlist.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            wishlist.description.clone_from(description);
        }
        if let Some(image) = &self.image {
            wishlist.image.clone_from(image);
        }
        if let Some(item_ids) = &self.item_ids {
            wishlist.item_ids.clone_from(item_ids);
        }
    }
}

/// Wishlist with owner and items resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistDetails {
    pub wishlist: Wishlist,
    pub owner: User,
    pub items: Vec<Wish>,
}

/// Drop duplicate ids while keeping the first occurrence.
pub(crate) fn dedup_item_ids(ids: Vec<WishId>) -> Vec<WishId> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
