//! Driving port for profile reads and updates.

use async_trait::async_trait;

use crate::domain::{Error, ProfileUpdate, User, UserId, Wish};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Profile of the authenticated user.
    async fn me(&self, user_id: UserId) -> Result<User, Error>;

    /// Update the authenticated user's profile.
    async fn update_me(&self, user_id: UserId, update: ProfileUpdate) -> Result<User, Error>;

    /// Wishes owned by `user_id`.
    async fn wishes_of(&self, user_id: UserId) -> Result<Vec<Wish>, Error>;

    /// Public profile lookup.
    async fn by_username(&self, username: &str) -> Result<User, Error>;

    /// Wishes owned by the user called `username`.
    async fn wishes_by_username(&self, username: &str) -> Result<Vec<Wish>, Error>;

    /// Users whose username or e-mail equals `query`.
    async fn find(&self, query: &str) -> Result<Vec<User>, Error>;
}
