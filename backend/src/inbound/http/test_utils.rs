//! Test helpers for inbound HTTP components.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use std::sync::Arc;

use crate::domain::ports::{
    MockCredentialService, MockOfferEngine, MockUserDirectory, MockWishLedger,
    MockWishlistCurator,
};
use crate::domain::{AuthClaims, Error, UserId};

use super::routes::configure;
use super::state::HttpState;

/// Token the default credential mock accepts for user 1 (`alice`).
pub const ALICE_TOKEN: &str = "alice-token";
/// Token the default credential mock accepts for user 2 (`bob`).
pub const BOB_TOKEN: &str = "bob-token";

pub fn claims_for(id: i64, username: &str) -> AuthClaims {
    AuthClaims {
        user_id: UserId::new(id),
        username: username.to_owned(),
    }
}

/// Mock driving ports, configured per test and then frozen into state.
#[derive(Default)]
pub struct StatePorts {
    pub credentials: MockCredentialService,
    pub users: MockUserDirectory,
    pub wishes: MockWishLedger,
    pub offers: MockOfferEngine,
    pub wishlists: MockWishlistCurator,
}

impl StatePorts {
    /// Ports whose credential mock knows [`ALICE_TOKEN`] and [`BOB_TOKEN`].
    pub fn with_known_tokens() -> Self {
        let mut ports = Self::default();
        ports
            .credentials
            .expect_authenticate()
            .returning(|token| match token {
                ALICE_TOKEN => Ok(claims_for(1, "alice")),
                BOB_TOKEN => Ok(claims_for(2, "bob")),
                _ => Err(Error::unauthorized("Invalid token")),
            });
        ports
    }

    pub fn into_state(self) -> HttpState {
        HttpState {
            credentials: Arc::new(self.credentials),
            users: Arc::new(self.users),
            wishes: Arc::new(self.wishes),
            offers: Arc::new(self.offers),
            wishlists: Arc::new(self.wishlists),
        }
    }
}

/// Application with every API route mounted over the given ports.
pub fn test_app(
    ports: StatePorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .configure(configure)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
