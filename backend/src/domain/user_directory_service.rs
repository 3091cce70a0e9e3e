//! Profile reads and updates.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{PasswordHasher, UserDirectory, UserRepository, WishRepository};
use crate::domain::repository_errors::{
    USER_NOT_FOUND, map_hash_error, map_user_error, map_wish_error, user_not_found,
};
use crate::domain::{Error, ProfileUpdate, User, UserId, UserPatch, Wish};

/// User service implementing the [`UserDirectory`] driving port.
#[derive(Clone)]
pub struct UserDirectoryService<U, W> {
    users: Arc<U>,
    wishes: Arc<W>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl<U, W> UserDirectoryService<U, W> {
    pub fn new(
        users: Arc<U>,
        wishes: Arc<W>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            wishes,
            hasher,
            clock,
        }
    }
}

#[async_trait]
impl<U, W> UserDirectory for UserDirectoryService<U, W>
where
    U: UserRepository,
    W: WishRepository,
{
    async fn me(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(user_id.get()))
    }

    async fn update_me(&self, user_id: UserId, update: ProfileUpdate) -> Result<User, Error> {
        let password_hash = match update.password.as_deref() {
            Some(password) => Some(self.hasher.hash(password).await.map_err(map_hash_error)?),
            None => None,
        };
        let patch = UserPatch {
            username: update.username,
            email: update.email,
            password_hash,
            about: update.about,
            avatar: update.avatar,
        };
        self.users
            .update(user_id, patch, self.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(user_id.get()))
    }

    async fn wishes_of(&self, user_id: UserId) -> Result<Vec<Wish>, Error> {
        self.wishes
            .list_by_owner(user_id)
            .await
            .map_err(map_wish_error)
    }

    async fn by_username(&self, username: &str) -> Result<User, Error> {
        self.users
            .find_by_username(username)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }

    async fn wishes_by_username(&self, username: &str) -> Result<Vec<Wish>, Error> {
        let user = self.by_username(username).await?;
        self.wishes_of(user.id).await
    }

    async fn find(&self, query: &str) -> Result<Vec<User>, Error> {
        self.users
            .find_by_username_or_email(query)
            .await
            .map_err(map_user_error)
    }
}
