//! Port for wish persistence.
//!
//! Every write bumps the wish `revision`. [`WishRepository::record_copy`] is
//! the only multi-row write: it increments the source's `copied` counter and
//! inserts the copy in one transaction, guarded by the revision the caller
//! read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewWish, UserId, Wish, WishId, WishPatch};

use super::define_port_error;

define_port_error! {
    /// Errors raised by wish repository adapters.
    pub enum WishRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "wish repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "wish repository query failed: {message}",
        /// The wish targeted by a guarded write no longer exists.
        NotFound { wish_id: i64 } => "wish {wish_id} not found",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}"; conflict,
        /// The owner already holds a copy of the source wish.
        DuplicateCopy { message: String } => "wish already copied: {message}",
        /// The write would leave `raised` above `price`.
        FundingBounds { wish_id: i64 } => "wish {wish_id} would be funded beyond its price",
    }
}

/// Port for wish storage and retrieval.
///
/// # Revision Semantics
///
/// - New wishes start at revision 0.
/// - `update` and `record_copy` (on the source) increment the revision.
/// - `record_copy` fails with [`WishRepositoryError::RevisionMismatch`] when
///   the source moved since it was read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WishRepository: Send + Sync {
    async fn find_by_id(&self, id: WishId) -> Result<Option<Wish>, WishRepositoryError>;

    /// Fetch every wish whose id is in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[WishId]) -> Result<Vec<Wish>, WishRepositoryError>;

    /// Newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Wish>, WishRepositoryError>;

    /// Most copied first; ties by ascending id.
    async fn list_top(&self, limit: usize) -> Result<Vec<Wish>, WishRepositoryError>;

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Wish>, WishRepositoryError>;

    /// The copy of `source_id` owned by `owner_id`, if any.
    async fn find_copy(
        &self,
        owner_id: UserId,
        source_id: WishId,
    ) -> Result<Option<Wish>, WishRepositoryError>;

    async fn insert(&self, wish: NewWish) -> Result<Wish, WishRepositoryError>;

    /// Apply `patch` verbatim. Returns `None` for unknown ids and
    /// [`WishRepositoryError::FundingBounds`] when the result would break
    /// `raised ≤ price`.
    async fn update(
        &self,
        id: WishId,
        patch: WishPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Wish>, WishRepositoryError>;

    /// Delete a wish and, by cascade, its offers. Returns whether a row went.
    async fn delete(&self, id: WishId) -> Result<bool, WishRepositoryError>;

    /// Increment the source's `copied` counter and insert `copy` atomically.
    async fn record_copy(
        &self,
        source_id: WishId,
        expected_revision: u32,
        copy: NewWish,
    ) -> Result<Wish, WishRepositoryError>;
}
