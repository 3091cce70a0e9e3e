//! Driving port for funding pledges.

use async_trait::async_trait;

use crate::domain::{Error, Offer, OfferDetails, OfferDraft, OfferId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferEngine: Send + Sync {
    /// Pledge `draft.amount` towards `draft.item_id` as `actor`.
    ///
    /// Forbidden for the wish owner, InvalidRequest when the pledge would
    /// fund the wish past its price.
    async fn create_offer(&self, actor: UserId, draft: OfferDraft) -> Result<Offer, Error>;

    async fn list_offers(&self) -> Result<Vec<OfferDetails>, Error>;

    async fn get_offer(&self, id: OfferId) -> Result<OfferDetails, Error>;
}
