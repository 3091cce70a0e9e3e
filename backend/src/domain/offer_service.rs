//! Offer engine service.
//!
//! Funding is a read-validate-write cycle: read the wish, check ownership and
//! the price cap against that snapshot, then commit through
//! [`OfferRepository::fund`] guarded by the snapshot's revision. A revision
//! mismatch re-runs the whole cycle so the cap check always sees fresh state.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{OfferEngine, OfferRepository, UserRepository, WishRepository};
use crate::domain::repository_errors::{
    map_offer_error, map_user_error, map_wish_error, user_not_found, wish_not_found,
};
use crate::domain::{
    Attempt, ConflictRetry, Error, FundingRequest, NewOffer, Offer, OfferDetails, OfferDraft,
    OfferId, User, UserId, Wish, WishId,
};

/// Offer service implementing the [`OfferEngine`] driving port.
#[derive(Clone)]
pub struct OfferEngineService<O, W, U> {
    offers: Arc<O>,
    wishes: Arc<W>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    retry: ConflictRetry,
}

impl<O, W, U> OfferEngineService<O, W, U> {
    /// Create a new service over the offer, wish and user stores.
    pub fn new(
        offers: Arc<O>,
        wishes: Arc<W>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
        retry: ConflictRetry,
    ) -> Self {
        Self {
            offers,
            wishes,
            users,
            clock,
            retry,
        }
    }
}

impl<O, W, U> OfferEngineService<O, W, U>
where
    O: OfferRepository,
    W: WishRepository,
    U: UserRepository,
{
    async fn try_fund(&self, actor: UserId, draft: OfferDraft) -> Result<Attempt<Offer>, Error> {
        let wish = self
            .wishes
            .find_by_id(draft.item_id)
            .await
            .map_err(map_wish_error)?
            .ok_or_else(|| wish_not_found(draft.item_id.get()))?;

        if wish.is_owned_by(actor) {
            return Err(Error::forbidden("You cannot fund your own wish")
                .with_details(json!({ "wishId": wish.id.get() })));
        }

        let raised = wish.funded_total(draft.amount).ok_or_else(|| {
            Error::invalid_request("Offer amount exceeds the remaining price").with_details(json!({
                "wishId": wish.id.get(),
                "price": wish.price.to_string(),
                "raised": wish.raised.to_string(),
                "amount": draft.amount.to_string(),
                "field": "amount",
            }))
        })?;

        let request = FundingRequest {
            offer: NewOffer {
                user_id: actor,
                item_id: wish.id,
                amount: draft.amount,
                hidden: draft.hidden,
                created_at: self.clock.utc(),
            },
            expected_revision: wish.revision,
            raised,
        };

        match self.offers.fund(request).await {
            Ok(offer) => Ok(Attempt::Done(offer)),
            Err(err) if err.is_conflict() => Ok(Attempt::Conflict),
            Err(err) => Err(map_offer_error(err)),
        }
    }

    async fn resolve(&self, offers: Vec<Offer>) -> Result<Vec<OfferDetails>, Error> {
        let mut user_ids: Vec<UserId> = offers.iter().map(|offer| offer.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let mut item_ids: Vec<WishId> = offers.iter().map(|offer| offer.item_id).collect();
        item_ids.sort_unstable();
        item_ids.dedup();

        let users: HashMap<UserId, User> = self
            .users
            .find_by_ids(&user_ids)
            .await
            .map_err(map_user_error)?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();
        let items: HashMap<WishId, Wish> = self
            .wishes
            .find_by_ids(&item_ids)
            .await
            .map_err(map_wish_error)?
            .into_iter()
            .map(|wish| (wish.id, wish))
            .collect();

        Ok(offers
            .into_iter()
            .filter_map(|offer| {
                let user = users.get(&offer.user_id)?.clone();
                let item = items.get(&offer.item_id)?.clone();
                Some(OfferDetails { offer, user, item })
            })
            .collect())
    }
}

#[async_trait]
impl<O, W, U> OfferEngine for OfferEngineService<O, W, U>
where
    O: OfferRepository,
    W: WishRepository,
    U: UserRepository,
{
    async fn create_offer(&self, actor: UserId, draft: OfferDraft) -> Result<Offer, Error> {
        if draft.amount.is_zero() {
            return Err(Error::invalid_request("amount must be positive")
                .with_details(json!({ "field": "amount", "code": "not_positive" })));
        }
        self.users
            .find_by_id(actor)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(actor.get()))?;

        let offer = self
            .retry
            .run("create_offer", |_| self.try_fund(actor, draft))
            .await?;
        info!(
            offer_id = %offer.id,
            wish_id = %offer.item_id,
            user_id = %actor,
            amount = %offer.amount,
            "offer created"
        );
        Ok(offer)
    }

    async fn list_offers(&self) -> Result<Vec<OfferDetails>, Error> {
        let offers = self.offers.list_all().await.map_err(map_offer_error)?;
        self.resolve(offers).await
    }

    async fn get_offer(&self, id: OfferId) -> Result<OfferDetails, Error> {
        let offer = self
            .offers
            .find_by_id(id)
            .await
            .map_err(map_offer_error)?
            .ok_or_else(|| {
                Error::not_found("Offer not found").with_details(json!({ "offerId": id.get() }))
            })?;
        self.resolve(vec![offer])
            .await?
            .pop()
            .ok_or_else(|| Error::internal(format!("offer {id} references missing records")))
    }
}

#[cfg(test)]
#[path = "offer_service_tests.rs"]
mod tests;
