//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`], [`TokenIssuer`]) are
//! implemented by outbound adapters. Driving ports ([`WishLedger`],
//! [`OfferEngine`], [`WishlistCurator`], [`UserDirectory`],
//! [`CredentialService`]) are implemented by domain services and called by the
//! HTTP adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_service;
mod offer_engine;
mod offer_repository;
mod password_hasher;
mod token_issuer;
mod user_directory;
mod user_repository;
mod wish_ledger;
mod wish_repository;
mod wishlist_curator;
mod wishlist_repository;

pub use credential_service::CredentialService;
#[cfg(test)]
pub use credential_service::MockCredentialService;
#[cfg(test)]
pub use offer_engine::MockOfferEngine;
pub use offer_engine::OfferEngine;
#[cfg(test)]
pub use offer_repository::MockOfferRepository;
pub use offer_repository::{OfferRepository, OfferRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::UserDirectory;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use wish_ledger::MockWishLedger;
pub use wish_ledger::WishLedger;
#[cfg(test)]
pub use wish_repository::MockWishRepository;
pub use wish_repository::{WishRepository, WishRepositoryError};
#[cfg(test)]
pub use wishlist_curator::MockWishlistCurator;
pub use wishlist_curator::WishlistCurator;
#[cfg(test)]
pub use wishlist_repository::MockWishlistRepository;
pub use wishlist_repository::{WishlistRepository, WishlistRepositoryError};
