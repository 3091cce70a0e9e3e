//! Wish records and the funding invariant.
//!
//! A wish is fundable by users other than its owner. `raised` is only ever
//! moved by the offer engine's funding path; owners may patch it directly, but
//! never outside `0 ≤ raised ≤ price`.

use chrono::{DateTime, Utc};

use super::{Money, Offer, User, UserId, WishId};

/// Number of wishes returned by the "last" and "top" listings.
pub const WISH_LISTING_LIMIT: usize = 10;

/// Stored wish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wish {
    pub id: WishId,
    pub name: String,
    pub link: String,
    pub image: String,
    pub description: String,
    pub price: Money,
    pub raised: Money,
    pub copied: u32,
    pub owner_id: UserId,
    pub original_wish_id: Option<WishId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by every write.
    pub revision: u32,
}

impl Wish {
    /// Whether `user_id` owns this wish.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Raised total after adding `amount`, or `None` when it would pass the
    /// price (or overflow).
    ///
    /// # Examples
    /// ```
    /// # use chrono::{DateTime, Utc};
    /// use wishlist_backend::domain::{Money, UserId, Wish, WishId};
    ///
    /// let wish = Wish {
    ///     id: WishId::new(1),
    ///     name: "Bike".to_owned(),
    ///     link: "https://shop.example/bike".to_owned(),
    ///     image: "https://shop.example/bike.png".to_owned(),
    ///     description: "Red".to_owned(),
    ///     price: "200.00".parse().expect("price"),
    ///     raised: "150.00".parse().expect("raised"),
    ///     copied: 0,
    ///     owner_id: UserId::new(1),
    ///     original_wish_id: None,
    ///     created_at: DateTime::<Utc>::UNIX_EPOCH,
    ///     updated_at: DateTime::<Utc>::UNIX_EPOCH,
    ///     revision: 0,
    /// };
    /// assert!(wish.funded_total("50.01".parse().expect("amount")).is_none());
    /// assert_eq!(
    ///     wish.funded_total("50.00".parse().expect("amount")),
    ///     Some("200.00".parse().expect("total"))
    /// );
    /// ```
    pub fn funded_total(&self, amount: Money) -> Option<Money> {
        self.raised
            .checked_add(amount)
            .filter(|total| *total <= self.price)
    }

    /// Build the insert payload for a copy of this wish owned by `owner_id`.
    pub fn copy_for(&self, owner_id: UserId, now: DateTime<Utc>) -> NewWish {
        NewWish {
            owner_id,
            name: self.name.clone(),
            link: self.link.clone(),
            image: self.image.clone(),
            description: self.description.clone(),
            price: self.price,
            original_wish_id: Some(self.id),
            created_at: now,
        }
    }
}

/// Validated fields supplied when creating a wish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishDraft {
    pub name: String,
    pub link: String,
    pub image: String,
    pub description: String,
    pub price: Money,
}

impl WishDraft {
    /// Insert payload for a fresh, unfunded wish.
    pub fn into_new_wish(self, owner_id: UserId, now: DateTime<Utc>) -> NewWish {
        NewWish {
            owner_id,
            name: self.name,
            link: self.link,
            image: self.image,
            description: self.description,
            price: self.price,
            original_wish_id: None,
            created_at: now,
        }
    }
}

/// Insert payload for the wish store. `raised` and `copied` start at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWish {
    pub owner_id: UserId,
    pub name: String,
    pub link: String,
    pub image: String,
    pub description: String,
    pub price: Money,
    pub original_wish_id: Option<WishId>,
    pub created_at: DateTime<Utc>,
}

/// Owner-initiated partial update. Present fields are applied verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishPatch {
    pub name: Option<String>,
    pub link: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub raised: Option<Money>,
}

impl WishPatch {
    /// Apply the present fields to `wish`.
    pub fn apply(&self, wish: &mut Wish) {
        if let Some(name) = &self.name {
            wish.name.clone_from(name);
        }
        if let Some(link) = &self.link {
            wish.link.clone_from(link);
        }
        if let Some(image) = &self.image {
            wish.image.clone_from(image);
        }
        if let Some(description) = &self.description {
            wish.description.clone_from(description);
        }
        if let Some(price) = self.price {
            wish.price = price;
        }
        if let Some(raised) = self.raised {
            wish.raised = raised;
        }
    }

    /// Whether applying the patch to `wish` keeps `raised ≤ price`.
    pub fn keeps_funding_bounds(&self, wish: &Wish) -> bool {
        let price = self.price.unwrap_or(wish.price);
        let raised = self.raised.unwrap_or(wish.raised);
        raised <= price
    }
}

/// Wish with its owner and offers resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishDetails {
    pub wish: Wish,
    pub owner: User,
    pub offers: Vec<(Offer, User)>,
}
