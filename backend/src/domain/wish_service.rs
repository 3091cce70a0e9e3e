//! Wish ledger service.
//!
//! Owner edits go through [`WishRepository::update`]. Copies go through
//! [`WishRepository::record_copy`], retried under the conflict policy when the
//! source wish moves between the read and the write.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    OfferRepository, UserRepository, WishLedger, WishRepository, WishRepositoryError,
};
use crate::domain::repository_errors::{
    map_offer_error, map_user_error, map_wish_error, user_not_found, wish_not_found,
};
use crate::domain::{
    Attempt, ConflictRetry, Error, User, UserId, WISH_LISTING_LIMIT, Wish, WishDetails, WishDraft,
    WishId, WishPatch,
};

/// Wish service implementing the [`WishLedger`] driving port.
#[derive(Clone)]
pub struct WishLedgerService<W, O, U> {
    wishes: Arc<W>,
    offers: Arc<O>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    retry: ConflictRetry,
}

impl<W, O, U> WishLedgerService<W, O, U> {
    /// Create a new service over the wish, offer and user stores.
    pub fn new(
        wishes: Arc<W>,
        offers: Arc<O>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
        retry: ConflictRetry,
    ) -> Self {
        Self {
            wishes,
            offers,
            users,
            clock,
            retry,
        }
    }
}

impl<W, O, U> WishLedgerService<W, O, U>
where
    W: WishRepository,
    O: OfferRepository,
    U: UserRepository,
{
    async fn load_wish(&self, id: WishId) -> Result<Wish, Error> {
        self.wishes
            .find_by_id(id)
            .await
            .map_err(map_wish_error)?
            .ok_or_else(|| wish_not_found(id.get()))
    }

    async fn load_user(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(id.get()))
    }

    async fn load_owned_wish(&self, actor: UserId, id: WishId) -> Result<Wish, Error> {
        let wish = self.load_wish(id).await?;
        if !wish.is_owned_by(actor) {
            return Err(Error::forbidden("You do not own this wish")
                .with_details(json!({ "wishId": id.get() })));
        }
        Ok(wish)
    }

    async fn try_copy(&self, actor: UserId, id: WishId) -> Result<Attempt<Wish>, Error> {
        let source = self.load_wish(id).await?;
        self.load_user(actor).await?;

        let existing = self
            .wishes
            .find_copy(actor, id)
            .await
            .map_err(map_wish_error)?;
        if existing.is_some() {
            return Err(already_copied(id));
        }

        let copy = source.copy_for(actor, self.clock.utc());
        match self.wishes.record_copy(id, source.revision, copy).await {
            Ok(created) => Ok(Attempt::Done(created)),
            Err(err) if err.is_conflict() => Ok(Attempt::Conflict),
            Err(WishRepositoryError::DuplicateCopy { .. }) => Err(already_copied(id)),
            Err(err) => Err(map_wish_error(err)),
        }
    }
}

fn already_copied(id: WishId) -> Error {
    Error::conflict("You have already copied this wish").with_details(json!({ "wishId": id.get() }))
}

#[async_trait]
impl<W, O, U> WishLedger for WishLedgerService<W, O, U>
where
    W: WishRepository,
    O: OfferRepository,
    U: UserRepository,
{
    async fn create_wish(&self, owner_id: UserId, draft: WishDraft) -> Result<Wish, Error> {
        self.load_user(owner_id).await?;
        let wish = self
            .wishes
            .insert(draft.into_new_wish(owner_id, self.clock.utc()))
            .await
            .map_err(map_wish_error)?;
        info!(wish_id = %wish.id, owner_id = %owner_id, "wish created");
        Ok(wish)
    }

    async fn get_wish(&self, id: WishId) -> Result<WishDetails, Error> {
        let wish = self.load_wish(id).await?;
        let owner = self.load_user(wish.owner_id).await?;
        let offers = self
            .offers
            .list_by_item(id)
            .await
            .map_err(map_offer_error)?;

        let mut contributor_ids: Vec<UserId> = offers.iter().map(|offer| offer.user_id).collect();
        contributor_ids.sort_unstable();
        contributor_ids.dedup();
        let contributors: HashMap<UserId, User> = self
            .users
            .find_by_ids(&contributor_ids)
            .await
            .map_err(map_user_error)?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let offers = offers
            .into_iter()
            .filter_map(|offer| {
                let user = contributors.get(&offer.user_id)?.clone();
                Some((offer, user))
            })
            .collect();
        Ok(WishDetails {
            wish,
            owner,
            offers,
        })
    }

    async fn list_recent(&self) -> Result<Vec<Wish>, Error> {
        self.wishes
            .list_recent(WISH_LISTING_LIMIT)
            .await
            .map_err(map_wish_error)
    }

    async fn list_top(&self) -> Result<Vec<Wish>, Error> {
        self.wishes
            .list_top(WISH_LISTING_LIMIT)
            .await
            .map_err(map_wish_error)
    }

    async fn update_wish(
        &self,
        actor: UserId,
        id: WishId,
        patch: WishPatch,
    ) -> Result<Wish, Error> {
        let wish = self.load_owned_wish(actor, id).await?;
        if !patch.keeps_funding_bounds(&wish) {
            return Err(
                Error::invalid_request("raised must stay between 0 and price").with_details(
                    json!({ "wishId": id.get(), "field": "raised", "code": "funding_bounds" }),
                ),
            );
        }
        self.wishes
            .update(id, patch, self.clock.utc())
            .await
            .map_err(map_wish_error)?
            .ok_or_else(|| wish_not_found(id.get()))
    }

    async fn delete_wish(&self, actor: UserId, id: WishId) -> Result<(), Error> {
        self.load_owned_wish(actor, id).await?;
        let deleted = self.wishes.delete(id).await.map_err(map_wish_error)?;
        if !deleted {
            return Err(wish_not_found(id.get()));
        }
        info!(wish_id = %id, "wish deleted");
        Ok(())
    }

    async fn copy_wish(&self, actor: UserId, id: WishId) -> Result<Wish, Error> {
        let copy = self
            .retry
            .run("copy_wish", |_| self.try_copy(actor, id))
            .await?;
        info!(source_id = %id, copy_id = %copy.id, owner_id = %actor, "wish copied");
        Ok(copy)
    }
}

#[cfg(test)]
#[path = "wish_service_tests.rs"]
mod tests;
