//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! the service wiring is repeated here over the in-memory store with cheap
//! Argon2 costs.

#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test as actix_test;
use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};

use wishlist_backend::domain::{
    ConflictRetry, CredentialServiceImpl, OfferEngineService, RetryPolicy, RetrySleeper,
    UserDirectoryService, WishLedgerService, WishlistCuratorService,
};
use wishlist_backend::inbound::http::state::HttpState;
use wishlist_backend::outbound::memory::MemoryStore;
use wishlist_backend::outbound::security::{Argon2PasswordHasher, JwtTokenIssuer};

/// Sleeper that returns immediately so retries do not slow the suite.
pub struct NoPause;

#[async_trait]
impl RetrySleeper for NoPause {
    async fn sleep(&self, _duration: Duration) {}
}

pub fn retry(max_attempts: u32) -> ConflictRetry {
    ConflictRetry::new(
        RetryPolicy {
            max_attempts,
            ..RetryPolicy::default()
        },
        Arc::new(NoPause),
    )
}

/// HTTP state over a fresh in-memory store.
pub fn memory_state(store: &Arc<MemoryStore>, max_attempts: u32) -> HttpState {
    memory_state_with_retry(store, retry(max_attempts))
}

/// HTTP state whose funding and copy writes use `conflict_retry`.
pub fn memory_state_with_retry(
    store: &Arc<MemoryStore>,
    conflict_retry: ConflictRetry,
) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher = Arc::new(Argon2PasswordHasher::new(8, 1).expect("valid argon2 costs"));
    let tokens = Arc::new(JwtTokenIssuer::new(
        b"integration-secret",
        TimeDelta::minutes(10),
        clock.clone(),
    ));
    HttpState {
        credentials: Arc::new(CredentialServiceImpl::new(
            store.clone(),
            hasher.clone(),
            tokens,
            clock.clone(),
        )),
        users: Arc::new(UserDirectoryService::new(
            store.clone(),
            store.clone(),
            hasher,
            clock.clone(),
        )),
        wishes: Arc::new(WishLedgerService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            clock.clone(),
            conflict_retry.clone(),
        )),
        offers: Arc::new(OfferEngineService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            clock.clone(),
            conflict_retry,
        )),
        wishlists: Arc::new(WishlistCuratorService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            clock,
        )),
    }
}

/// Build the application exactly as the server mounts the API.
#[macro_export]
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap(wishlist_backend::Trace)
                .configure(wishlist_backend::inbound::http::routes::configure),
        )
        .await
    };
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Call the app and decode the JSON body, yielding `Null` for empty bodies.
pub async fn send<S>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = actix_test::call_service(app, req).await;
    let status = res.status();
    let body = actix_test::read_body(res).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// A signed-in account.
pub struct Account {
    pub id: i64,
    pub token: String,
}

pub async fn register<S>(app: &S, username: &str) -> Account
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, user) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "hunter22"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {user}");

    let (status, body) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signin")
            .set_json(json!({"username": username, "password": "hunter22"}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signin failed: {body}");

    Account {
        id: user["id"].as_i64().expect("user id"),
        token: body["accessToken"]
            .as_str()
            .expect("access token")
            .to_owned(),
    }
}

/// Create a wish named `name` priced at `price` and return its id.
pub async fn create_wish<S>(app: &S, owner: &Account, name: &str, price: &str) -> i64
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/wishes")
            .insert_header(bearer(&owner.token))
            .set_json(json!({
                "name": name,
                "link": "https://shop.example/item",
                "image": "https://shop.example/item.png",
                "description": format!("{name} from the shop"),
                "price": price
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create wish failed: {body}");
    body["id"].as_i64().expect("wish id")
}

pub async fn offer<S>(app: &S, from: &Account, wish_id: i64, amount: &str, hidden: bool) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/offers")
            .insert_header(bearer(&from.token))
            .set_json(json!({"itemId": wish_id, "amount": amount, "hidden": hidden}))
            .to_request(),
    )
    .await
}

pub async fn get_wish<S>(app: &S, viewer: Option<&Account>, wish_id: i64) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut req = actix_test::TestRequest::get().uri(&format!("/api/v1/wishes/{wish_id}"));
    if let Some(viewer) = viewer {
        req = req.insert_header(bearer(&viewer.token));
    }
    send(app, req.to_request()).await
}
