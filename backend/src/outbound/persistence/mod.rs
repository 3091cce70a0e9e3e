//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel rows and domain types and map
//! database failures onto their port's error enum. Row structs (`models.rs`)
//! and table definitions (`schema.rs`) never leave this module.
//!
//! ```ignore
//! use wishlist_backend::outbound::persistence::{DbPool, DieselWishRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/wishlist")).await?;
//! let wishes = DieselWishRepository::new(pool);
//! ```

mod diesel_helpers;
mod diesel_offer_repository;
mod diesel_user_repository;
mod diesel_wish_repository;
mod diesel_wishlist_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_offer_repository::DieselOfferRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_wish_repository::DieselWishRepository;
pub use diesel_wishlist_repository::DieselWishlistRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
