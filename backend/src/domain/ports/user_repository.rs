//! Port abstraction for the identity store and its errors.
//!
//! The store enforces uniqueness of usernames and e-mail addresses. Adapters
//! surface a violated unique constraint as [`UserPersistenceError::Duplicate`]
//! so a signup racing another signup still ends in a conflict.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewUser, User, UserCredentials, UserId, UserPatch};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Username or e-mail already taken.
        Duplicate { message: String } => "user already exists: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch every user whose id is in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by exact username.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<User>, UserPersistenceError>;

    /// Users whose username or e-mail equals `query`.
    async fn find_by_username_or_email(
        &self,
        query: &str,
    ) -> Result<Vec<User>, UserPersistenceError>;

    /// Whether any user already holds `username` or `email`.
    async fn exists(&self, username: &str, email: &str) -> Result<bool, UserPersistenceError>;

    /// Stored password digest for sign-in.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// Insert a new user and return it with its assigned id.
    async fn insert(&self, user: NewUser) -> Result<User, UserPersistenceError>;

    /// Apply `patch` and stamp `updated_at`. Returns `None` for unknown ids.
    async fn update(
        &self,
        id: UserId,
        patch: UserPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError>;
}
