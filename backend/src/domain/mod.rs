//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities shared by the HTTP and
//! persistence adapters, plus the services implementing the driving ports.
//! Relations are id references resolved on read; nothing here holds live
//! object graphs.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Money: fixed-point amount in cents.
//! - User, Wish, Offer, Wishlist and their drafts/patches.
//! - Services: `WishLedgerService`, `OfferEngineService`,
//!   `WishlistCuratorService`, `UserDirectoryService`,
//!   `CredentialServiceImpl`.

pub mod auth;
pub mod error;
pub mod ids;
pub mod money;
pub mod offer;
pub mod ports;
pub mod retry;
pub mod trace_id;
pub mod user;
pub mod wish;
pub mod wishlist;

mod credential_service;
mod offer_service;
mod repository_errors;
mod user_directory_service;
mod wish_service;
mod wishlist_service;

pub use self::auth::{AccessToken, AuthClaims, LoginCredentials, LoginValidationError};
pub use self::credential_service::CredentialServiceImpl;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{OfferId, UserId, WishId, WishlistId};
pub use self::money::{Money, MoneyParseError};
pub use self::offer::{FundingRequest, NewOffer, Offer, OfferDetails, OfferDraft};
pub use self::offer_service::OfferEngineService;
pub use self::retry::{Attempt, ConflictRetry, RetryPolicy, RetrySleeper, TokioSleeper};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DEFAULT_ABOUT, DEFAULT_AVATAR, NewUser, ProfileUpdate, Registration, User, UserCredentials,
    UserPatch,
};
pub use self::user_directory_service::UserDirectoryService;
pub use self::wish::{NewWish, WISH_LISTING_LIMIT, Wish, WishDetails, WishDraft, WishPatch};
pub use self::wish_service::WishLedgerService;
pub use self::wishlist::{NewWishlist, Wishlist, WishlistDetails, WishlistDraft, WishlistPatch};
pub use self::wishlist_service::WishlistCuratorService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use wishlist_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
