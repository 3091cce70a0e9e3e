//! Port for offer persistence and the privileged funding write.

use async_trait::async_trait;

use crate::domain::{FundingRequest, Offer, OfferId, WishId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by offer repository adapters.
    pub enum OfferRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "offer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "offer repository query failed: {message}",
        /// The funded wish disappeared between read and write.
        WishNotFound { wish_id: i64 } => "wish {wish_id} not found",
        /// The funded wish moved since it was read.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}"; conflict,
    }
}

/// Port for offer storage.
///
/// Offers are immutable; the only write is [`OfferRepository::fund`], which
/// inserts the offer and sets the wish's `raised` total in one transaction,
/// provided the wish is still at the revision the caller validated against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Offer>, OfferRepositoryError>;

    async fn find_by_id(&self, id: OfferId) -> Result<Option<Offer>, OfferRepositoryError>;

    /// Offers pledged against `item_id`, oldest first.
    async fn list_by_item(&self, item_id: WishId) -> Result<Vec<Offer>, OfferRepositoryError>;

    async fn fund(&self, request: FundingRequest) -> Result<Offer, OfferRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OfferRepositoryError::wish_not_found(4_i64), "wish 4 not found")]
    #[case(
        OfferRepositoryError::revision_mismatch(2_u32, 3_u32),
        "revision mismatch: expected 2, found 3"
    )]
    fn errors_format_context(#[case] error: OfferRepositoryError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
