//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod dto;
pub mod error;
pub mod health;
pub mod offers;
pub mod routes;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod wishes;
pub mod wishlists;

pub use error::ApiResult;
