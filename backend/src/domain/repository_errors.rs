//! Mapping from driven-port errors to domain errors shared by the services.
//!
//! Connection failures become `service_unavailable` and are safe to retry;
//! query failures become `internal_error` and are logged with context.

use serde_json::json;
use tracing::error;

use crate::domain::Error;
use crate::domain::ports::{
    OfferRepositoryError, PasswordHashError, TokenError, UserPersistenceError,
    WishRepositoryError, WishlistRepositoryError,
};

pub(crate) const USER_NOT_FOUND: &str = "User not found";
pub(crate) const WISH_NOT_FOUND: &str = "Wish not found";
pub(crate) const DUPLICATE_USER: &str = "Username or email already exists";

fn unavailable(store: &'static str, message: String) -> Error {
    error!(store, %message, "repository connection failed");
    Error::service_unavailable(format!("{store} repository unavailable: {message}"))
}

fn query_failed(store: &'static str, message: String) -> Error {
    error!(store, %message, "repository query failed");
    Error::internal(format!("{store} repository error: {message}"))
}

fn concurrent_update(expected: u32, actual: u32) -> Error {
    Error::service_unavailable("the item is being updated concurrently, please retry").with_details(
        json!({
            "expectedRevision": expected,
            "actualRevision": actual,
            "code": "revision_mismatch",
        }),
    )
}

pub(crate) fn wish_not_found(wish_id: i64) -> Error {
    Error::not_found(WISH_NOT_FOUND).with_details(json!({ "wishId": wish_id }))
}

pub(crate) fn user_not_found(user_id: i64) -> Error {
    Error::not_found(USER_NOT_FOUND).with_details(json!({ "userId": user_id }))
}

pub(crate) fn map_user_error(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Connection { message } => unavailable("user", message),
        UserPersistenceError::Query { message } => query_failed("user", message),
        UserPersistenceError::Duplicate { .. } => Error::conflict(DUPLICATE_USER),
    }
}

pub(crate) fn map_wish_error(err: WishRepositoryError) -> Error {
    match err {
        WishRepositoryError::Connection { message } => unavailable("wish", message),
        WishRepositoryError::Query { message } => query_failed("wish", message),
        WishRepositoryError::NotFound { wish_id } => wish_not_found(wish_id),
        WishRepositoryError::RevisionMismatch { expected, actual } => {
            concurrent_update(expected, actual)
        }
        WishRepositoryError::DuplicateCopy { .. } => Error::conflict("Wish already copied"),
        WishRepositoryError::FundingBounds { wish_id } => {
            Error::invalid_request("raised must stay between 0 and price")
                .with_details(json!({ "wishId": wish_id, "field": "raised" }))
        }
    }
}

pub(crate) fn map_offer_error(err: OfferRepositoryError) -> Error {
    match err {
        OfferRepositoryError::Connection { message } => unavailable("offer", message),
        OfferRepositoryError::Query { message } => query_failed("offer", message),
        OfferRepositoryError::WishNotFound { wish_id } => wish_not_found(wish_id),
        OfferRepositoryError::RevisionMismatch { expected, actual } => {
            concurrent_update(expected, actual)
        }
    }
}

pub(crate) fn map_wishlist_error(err: WishlistRepositoryError) -> Error {
    match err {
        WishlistRepositoryError::Connection { message } => unavailable("wishlist", message),
        WishlistRepositoryError::Query { message } => query_failed("wishlist", message),
    }
}

pub(crate) fn map_hash_error(err: PasswordHashError) -> Error {
    error!(error = %err, "password hashing failed");
    Error::internal(err.to_string())
}

pub(crate) fn map_token_error(err: TokenError) -> Error {
    match err {
        TokenError::Expired => Error::unauthorized("Token expired"),
        TokenError::Invalid { .. } => Error::unauthorized("Invalid token"),
        TokenError::Signing { message } => {
            error!(%message, "token signing failed");
            Error::internal(format!("token signing failed: {message}"))
        }
    }
}
