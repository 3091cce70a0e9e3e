//! Funding pledges against a wish.

use chrono::{DateTime, Utc};

use super::{Money, OfferId, User, UserId, Wish, WishId};

/// Stored offer. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub id: OfferId,
    pub amount: Money,
    /// Hides contributor and amount from third parties; no effect on funding.
    pub hidden: bool,
    pub user_id: UserId,
    pub item_id: WishId,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Whether `viewer` may see who pledged and how much.
    ///
    /// Visible offers are public. Hidden ones are shown only to the
    /// contributor and to the owner of the funded wish.
    pub fn is_disclosed_to(&self, viewer: Option<UserId>, item_owner: UserId) -> bool {
        if !self.hidden {
            return true;
        }
        viewer.is_some_and(|id| id == self.user_id || id == item_owner)
    }
}

/// Validated offer request from a contributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferDraft {
    pub item_id: WishId,
    pub amount: Money,
    pub hidden: bool,
}

/// Insert payload for an offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOffer {
    pub user_id: UserId,
    pub item_id: WishId,
    pub amount: Money,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
}

/// Atomic funding write: insert the offer and move the wish's `raised` total,
/// provided the wish is still at `expected_revision`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingRequest {
    pub offer: NewOffer,
    pub expected_revision: u32,
    pub raised: Money,
}

/// Offer with contributor and funded wish resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferDetails {
    pub offer: Offer,
    pub user: User,
    pub item: Wish,
}
