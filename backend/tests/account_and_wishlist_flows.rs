//! End-to-end account, copy and wishlist flows against the in-memory store.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::{Value, json};

use wishlist_backend::outbound::memory::MemoryStore;

mod support;

use support::{bearer, create_wish, get_wish, memory_state, register, send};

#[actix_web::test]
async fn signup_signin_and_profile_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app!(memory_state(&store, 5));
    let alice = register(&app, "alice").await;

    let (status, me) = send(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .insert_header(bearer(&alice.token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "alice@example.com");
    assert!(me.get("password").is_none());

    let (status, updated) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/users/me")
            .insert_header(bearer(&alice.token))
            .set_json(json!({"about": "Collects lamps", "password": "new-secret"}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["about"], "Collects lamps");

    let (status, _) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signin")
            .set_json(json!({"username": "alice", "password": "hunter22"}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signin")
            .set_json(json!({"username": "alice", "password": "new-secret"}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, public) = send(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/alice")
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(public.get("email").is_none());
}

#[actix_web::test]
async fn duplicate_signup_is_a_conflict() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app!(memory_state(&store, 5));
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({
                "username": "alice",
                "email": "other@example.com",
                "password": "hunter22"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

async fn copy<S>(app: &S, token: &str, wish_id: i64) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    send(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/wishes/{wish_id}/copy"))
            .insert_header(bearer(token))
            .to_request(),
    )
    .await
}

#[actix_web::test]
async fn copying_twice_conflicts_and_counts_once() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app!(memory_state(&store, 5));
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let bike = create_wish(&app, &alice, "Bike", "300.00").await;
    support::offer(&app, &bob, bike, "30.00", false).await;

    let (status, first) = copy(&app, &bob.token, bike).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["originalWishId"], bike);
    assert_eq!(first["ownerId"], bob.id);
    assert_eq!(first["raised"], "0.00");
    assert_eq!(first["copied"], 0);
    assert_eq!(first["price"], "300.00");

    let (status, second) = copy(&app, &bob.token, bike).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(second["code"], "conflict");

    let (_, source) = get_wish(&app, None, bike).await;
    assert_eq!(source["copied"], 1);
    assert_eq!(source["raised"], "30.00");
}

#[actix_web::test]
async fn top_wishes_follow_copy_counts() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app!(memory_state(&store, 5));
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let carol = register(&app, "carol").await;
    let bike = create_wish(&app, &alice, "Bike", "300.00").await;
    let lamp = create_wish(&app, &alice, "Lamp", "40.00").await;
    copy(&app, &bob.token, lamp).await;
    copy(&app, &carol.token, lamp).await;
    copy(&app, &bob.token, bike).await;

    let (status, top) = send(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/wishes/top")
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(top[0]["id"], lamp);
    assert_eq!(top[1]["id"], bike);

    let (_, last) = send(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/wishes/last")
            .to_request(),
    )
    .await;
    let ids: Vec<i64> = last
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|wish| wish["id"].as_i64())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids, sorted);
    assert_eq!(ids.len(), 5);
}

#[actix_web::test]
async fn wishlists_drop_unknown_items_and_guard_ownership() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app!(memory_state(&store, 5));
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let bike = create_wish(&app, &alice, "Bike", "300.00").await;
    let lamp = create_wish(&app, &alice, "Lamp", "40.00").await;

    let (status, created) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/wishlists")
            .insert_header(bearer(&alice.token))
            .set_json(json!({
                "name": "Birthday",
                "image": "https://shop.example/cake.png",
                "itemsId": [lamp, 999, bike]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let list_id = created["id"].as_i64().expect("wishlist id");
    let item_ids: Vec<i64> = created["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|item| item["id"].as_i64())
        .collect();
    assert_eq!(item_ids, vec![lamp, bike]);
    assert_eq!(created["owner"]["username"], "alice");

    let (status, _) = send(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/wishlists/{list_id}"))
            .insert_header(bearer(&bob.token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/wishes/{lamp}"))
            .insert_header(bearer(&alice.token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, fetched) = send(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/wishlists/{list_id}"))
            .insert_header(bearer(&bob.token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(fetched["items"][0]["id"], bike);

    let (status, updated) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/wishlists/{list_id}"))
            .insert_header(bearer(&alice.token))
            .set_json(json!({"name": "Xmas", "itemsId": []}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Xmas");
    assert_eq!(updated["items"], json!([]));

    let (_, mine) = send(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/wishlists")
            .insert_header(bearer(&alice.token))
            .to_request(),
    )
    .await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
}
