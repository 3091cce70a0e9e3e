use async_trait::async_trait;

use crate::domain::ports::{OfferRepository, OfferRepositoryError};
use crate::domain::{FundingRequest, Offer, OfferId, WishId};

use super::MemoryStore;

fn lock_error(message: &'static str) -> OfferRepositoryError {
    OfferRepositoryError::connection(message)
}

#[async_trait]
impl OfferRepository for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Offer>, OfferRepositoryError> {
        let tables = self.lock(lock_error)?;
        Ok(tables.offers.values().cloned().collect())
    }

    async fn find_by_id(&self, id: OfferId) -> Result<Option<Offer>, OfferRepositoryError> {
        let tables = self.lock(lock_error)?;
        Ok(tables.offers.get(&id.get()).cloned())
    }

    async fn list_by_item(&self, item_id: WishId) -> Result<Vec<Offer>, OfferRepositoryError> {
        let tables = self.lock(lock_error)?;
        let mut offers: Vec<Offer> = tables
            .offers
            .values()
            .filter(|offer| offer.item_id == item_id)
            .cloned()
            .collect();
        offers.sort_by_key(|offer| (offer.created_at, offer.id));
        Ok(offers)
    }

    async fn fund(&self, request: FundingRequest) -> Result<Offer, OfferRepositoryError> {
        let FundingRequest {
            offer,
            expected_revision,
            raised,
        } = request;
        let mut tables = self.lock(lock_error)?;
        let Some(wish) = tables.wishes.get_mut(&offer.item_id.get()) else {
            return Err(OfferRepositoryError::wish_not_found(offer.item_id.get()));
        };
        if wish.revision != expected_revision {
            return Err(OfferRepositoryError::revision_mismatch(
                expected_revision,
                wish.revision,
            ));
        }
        if raised > wish.price {
            return Err(OfferRepositoryError::query(
                "check constraint violated: wishes_raised_within_price",
            ));
        }
        wish.raised = raised;
        wish.revision = wish.revision.wrapping_add(1);
        wish.updated_at = offer.created_at;

        let id = tables.offer_ids.next();
        let stored = Offer {
            id: OfferId::new(id),
            amount: offer.amount,
            hidden: offer.hidden,
            user_id: offer.user_id,
            item_id: offer.item_id,
            created_at: offer.created_at,
        };
        tables.offers.insert(id, stored.clone());
        Ok(stored)
    }
}
