//! Wishlist curator service: ownership-guarded CRUD over named wish groups.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use crate::domain::ports::{UserRepository, WishRepository, WishlistCurator, WishlistRepository};
use crate::domain::repository_errors::{
    map_user_error, map_wish_error, map_wishlist_error, user_not_found,
};
use crate::domain::wishlist::dedup_item_ids;
use crate::domain::{
    Error, NewWishlist, User, UserId, WishId, Wishlist, WishlistDetails, WishlistDraft,
    WishlistId, WishlistPatch,
};

fn wishlist_not_found(id: WishlistId) -> Error {
    Error::not_found("Wishlist not found").with_details(json!({ "wishlistId": id.get() }))
}

/// Wishlist service implementing the [`WishlistCurator`] driving port.
#[derive(Clone)]
pub struct WishlistCuratorService<L, W, U> {
    wishlists: Arc<L>,
    wishes: Arc<W>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<L, W, U> WishlistCuratorService<L, W, U> {
    pub fn new(wishlists: Arc<L>, wishes: Arc<W>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            wishlists,
            wishes,
            users,
            clock,
        }
    }
}

impl<L, W, U> WishlistCuratorService<L, W, U>
where
    L: WishlistRepository,
    W: WishRepository,
    U: UserRepository,
{
    async fn load_user(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(id.get()))
    }

    async fn load_wishlist(&self, id: WishlistId) -> Result<Wishlist, Error> {
        self.wishlists
            .find_by_id(id)
            .await
            .map_err(map_wishlist_error)?
            .ok_or_else(|| wishlist_not_found(id))
    }

    async fn load_owned(&self, actor: UserId, id: WishlistId) -> Result<Wishlist, Error> {
        let wishlist = self.load_wishlist(id).await?;
        if wishlist.owner_id != actor {
            return Err(Error::forbidden("You do not own this wishlist")
                .with_details(json!({ "wishlistId": id.get() })));
        }
        Ok(wishlist)
    }

    /// Keep only ids that resolve to a stored wish, in request order.
    async fn resolve_item_ids(&self, ids: Vec<WishId>) -> Result<Vec<WishId>, Error> {
        let ids = dedup_item_ids(ids);
        if ids.is_empty() {
            return Ok(ids);
        }
        let found: HashSet<WishId> = self
            .wishes
            .find_by_ids(&ids)
            .await
            .map_err(map_wish_error)?
            .into_iter()
            .map(|wish| wish.id)
            .collect();
        Ok(ids.into_iter().filter(|id| found.contains(id)).collect())
    }

    async fn hydrate(&self, wishlist: Wishlist, owner: &User) -> Result<WishlistDetails, Error> {
        let items = self
            .wishes
            .find_by_ids(&wishlist.item_ids)
            .await
            .map_err(map_wish_error)?;
        Ok(WishlistDetails {
            wishlist,
            owner: owner.clone(),
            items,
        })
    }
}

#[async_trait]
impl<L, W, U> WishlistCurator for WishlistCuratorService<L, W, U>
where
    L: WishlistRepository,
    W: WishRepository,
    U: UserRepository,
{
    async fn list(&self, owner_id: UserId) -> Result<Vec<WishlistDetails>, Error> {
        let owner = self.load_user(owner_id).await?;
        let wishlists = self
            .wishlists
            .list_by_owner(owner_id)
            .await
            .map_err(map_wishlist_error)?;
        let mut details = Vec::with_capacity(wishlists.len());
        for wishlist in wishlists {
            details.push(self.hydrate(wishlist, &owner).await?);
        }
        Ok(details)
    }

    async fn get(&self, id: WishlistId) -> Result<WishlistDetails, Error> {
        let wishlist = self.load_wishlist(id).await?;
        let owner = self.load_user(wishlist.owner_id).await?;
        self.hydrate(wishlist, &owner).await
    }

    async fn create(
        &self,
        owner_id: UserId,
        draft: WishlistDraft,
    ) -> Result<WishlistDetails, Error> {
        let owner = self.load_user(owner_id).await?;
        let item_ids = self.resolve_item_ids(draft.item_ids).await?;
        let wishlist = self
            .wishlists
            .insert(NewWishlist {
                owner_id,
                name: draft.name,
                description: draft.description,
                image: draft.image,
                item_ids,
                created_at: self.clock.utc(),
            })
            .await
            .map_err(map_wishlist_error)?;
        self.hydrate(wishlist, &owner).await
    }

    async fn update(
        &self,
        actor: UserId,
        id: WishlistId,
        mut patch: WishlistPatch,
    ) -> Result<WishlistDetails, Error> {
        self.load_owned(actor, id).await?;
        if let Some(ids) = patch.item_ids.take() {
            patch.item_ids = Some(self.resolve_item_ids(ids).await?);
        }
        let wishlist = self
            .wishlists
            .update(id, patch, self.clock.utc())
            .await
            .map_err(map_wishlist_error)?
            .ok_or_else(|| wishlist_not_found(id))?;
        let owner = self.load_user(actor).await?;
        self.hydrate(wishlist, &owner).await
    }

    async fn delete(&self, actor: UserId, id: WishlistId) -> Result<(), Error> {
        self.load_owned(actor, id).await?;
        let deleted = self
            .wishlists
            .delete(id)
            .await
            .map_err(map_wishlist_error)?;
        if !deleted {
            return Err(wishlist_not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockUserRepository, MockWishRepository, MockWishlistRepository};
    use crate::test_support::{fixed_clock, fixed_now, sample_user, sample_wish};

    type Service =
        WishlistCuratorService<MockWishlistRepository, MockWishRepository, MockUserRepository>;

    fn make_service(
        wishlists: MockWishlistRepository,
        wishes: MockWishRepository,
        users: MockUserRepository,
    ) -> Service {
        WishlistCuratorService::new(
            Arc::new(wishlists),
            Arc::new(wishes),
            Arc::new(users),
            fixed_clock(),
        )
    }

    fn known_users() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id.get(), "owner"))));
        users
    }

    /// Wishes 1 and 2 exist; everything else is unknown.
    fn known_wishes() -> MockWishRepository {
        let mut wishes = MockWishRepository::new();
        wishes.expect_find_by_ids().returning(|ids| {
            Ok(ids
                .iter()
                .filter(|id| [1, 2].contains(&id.get()))
                .map(|id| sample_wish(id.get(), 1, 10_000, 0))
                .collect())
        });
        wishes
    }

    fn stored(id: i64, owner: i64, items: &[i64]) -> Wishlist {
        Wishlist {
            id: WishlistId::new(id),
            name: "Birthday".to_owned(),
            description: String::new(),
            image: "https://img.example/cake.png".to_owned(),
            owner_id: UserId::new(owner),
            item_ids: items.iter().copied().map(WishId::new).collect(),
            created_at: fixed_now(),
            updated_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn create_drops_unknown_item_ids() {
        let mut wishlists = MockWishlistRepository::new();
        wishlists.expect_insert().times(1).returning(|new| {
            assert_eq!(new.item_ids, vec![WishId::new(2), WishId::new(1)]);
            Ok(stored(3, 1, &[2, 1]))
        });
        let service = make_service(wishlists, known_wishes(), known_users());

        let details = service
            .create(
                UserId::new(1),
                WishlistDraft {
                    name: "Birthday".to_owned(),
                    description: String::new(),
                    image: "https://img.example/cake.png".to_owned(),
                    item_ids: [2, 99, 1, 2].map(WishId::new).to_vec(),
                },
            )
            .await
            .expect("created");

        assert_eq!(details.items.len(), 2);
        assert_eq!(details.owner.id, UserId::new(1));
    }

    #[tokio::test]
    async fn update_by_non_owner_is_forbidden() {
        let mut wishlists = MockWishlistRepository::new();
        wishlists
            .expect_find_by_id()
            .returning(|_| Ok(Some(stored(3, 1, &[]))));
        wishlists.expect_update().times(0);
        let service = make_service(wishlists, known_wishes(), known_users());

        let err = service
            .update(UserId::new(2), WishlistId::new(3), WishlistPatch::default())
            .await
            .expect_err("non-owner");

        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn update_replaces_items_with_resolved_ids() {
        let mut wishlists = MockWishlistRepository::new();
        wishlists
            .expect_find_by_id()
            .returning(|_| Ok(Some(stored(3, 1, &[1]))));
        wishlists
            .expect_update()
            .times(1)
            .returning(|_, patch, _| {
                assert_eq!(patch.item_ids, Some(vec![WishId::new(2)]));
                Ok(Some(stored(3, 1, &[2])))
            });
        let service = make_service(wishlists, known_wishes(), known_users());

        let details = service
            .update(
                UserId::new(1),
                WishlistId::new(3),
                WishlistPatch {
                    item_ids: Some(vec![WishId::new(2), WishId::new(42)]),
                    ..WishlistPatch::default()
                },
            )
            .await
            .expect("updated");

        assert_eq!(details.wishlist.item_ids, vec![WishId::new(2)]);
    }

    #[tokio::test]
    async fn get_missing_wishlist_is_not_found() {
        let mut wishlists = MockWishlistRepository::new();
        wishlists.expect_find_by_id().returning(|_| Ok(None));
        let service = make_service(wishlists, known_wishes(), known_users());

        let err = service
            .get(WishlistId::new(8))
            .await
            .expect_err("missing");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_by_owner_removes_row() {
        let mut wishlists = MockWishlistRepository::new();
        wishlists
            .expect_find_by_id()
            .returning(|_| Ok(Some(stored(3, 1, &[]))));
        wishlists.expect_delete().times(1).returning(|_| Ok(true));
        let service = make_service(wishlists, known_wishes(), known_users());

        service
            .delete(UserId::new(1), WishlistId::new(3))
            .await
            .expect("deleted");
    }
}
