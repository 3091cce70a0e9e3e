//! Tests for the offer engine service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockOfferRepository, MockUserRepository, MockWishRepository, OfferRepositoryError,
};
use crate::domain::{ErrorCode, Money};
use crate::test_support::{
    fixed_clock, fixed_now, immediate_retry, sample_offer, sample_user, sample_wish,
};

type Service = OfferEngineService<MockOfferRepository, MockWishRepository, MockUserRepository>;

fn make_service(
    offers: MockOfferRepository,
    wishes: MockWishRepository,
    users: MockUserRepository,
) -> Service {
    OfferEngineService::new(
        Arc::new(offers),
        Arc::new(wishes),
        Arc::new(users),
        fixed_clock(),
        immediate_retry(3),
    )
}

fn any_user() -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(sample_user(id.get(), "someone"))));
    users
}

fn wish_store(price: &str, raised: &str) -> MockWishRepository {
    let price: Money = price.parse().expect("price");
    let raised: Money = raised.parse().expect("raised");
    let mut wishes = MockWishRepository::new();
    wishes
        .expect_find_by_id()
        .returning(move |_| Ok(Some(sample_wish(5, 1, price.cents(), raised.cents()))));
    wishes
}

fn draft(amount: &str) -> OfferDraft {
    OfferDraft {
        item_id: WishId::new(5),
        amount: amount.parse().expect("amount"),
        hidden: false,
    }
}

fn echo_fund(offers: &mut MockOfferRepository) {
    offers.expect_fund().times(1).returning(|request| {
        Ok(Offer {
            id: OfferId::new(11),
            amount: request.offer.amount,
            hidden: request.offer.hidden,
            user_id: request.offer.user_id,
            item_id: request.offer.item_id,
            created_at: request.offer.created_at,
        })
    });
}

#[tokio::test]
async fn self_funding_is_forbidden() {
    let mut offers = MockOfferRepository::new();
    offers.expect_fund().times(0);
    let service = make_service(offers, wish_store("300.00", "0"), any_user());

    let err = service
        .create_offer(UserId::new(1), draft("50.00"))
        .await
        .expect_err("own wish");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case("200.00", "150.00", "50.01")]
#[case("300.00", "100.00", "250.00")]
#[tokio::test]
async fn amounts_past_price_are_rejected(
    #[case] price: &str,
    #[case] raised: &str,
    #[case] amount: &str,
) {
    let mut offers = MockOfferRepository::new();
    offers.expect_fund().times(0);
    let service = make_service(offers, wish_store(price, raised), any_user());

    let err = service
        .create_offer(UserId::new(2), draft(amount))
        .await
        .expect_err("exceeds price");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn exact_remainder_funds_to_price() {
    let mut offers = MockOfferRepository::new();
    offers.expect_fund().times(1).returning(|request| {
        assert_eq!(request.raised, Money::from_cents(20_000));
        assert_eq!(request.expected_revision, 0);
        assert_eq!(request.offer.created_at, fixed_now());
        Ok(sample_offer(11, 2, 5, request.offer.amount.cents(), false))
    });
    let service = make_service(offers, wish_store("200.00", "150.00"), any_user());

    let offer = service
        .create_offer(UserId::new(2), draft("50.00"))
        .await
        .expect("fits exactly");

    assert_eq!(offer.amount, Money::from_cents(5_000));
}

#[tokio::test]
async fn hidden_flag_is_persisted() {
    let mut offers = MockOfferRepository::new();
    echo_fund(&mut offers);
    let service = make_service(offers, wish_store("300.00", "0"), any_user());

    let offer = service
        .create_offer(
            UserId::new(2),
            OfferDraft {
                hidden: true,
                ..draft("10.00")
            },
        )
        .await
        .expect("offer created");

    assert!(offer.hidden);
}

#[tokio::test]
async fn zero_amount_is_rejected_before_any_read() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().times(0);
    let service = make_service(
        MockOfferRepository::new(),
        MockWishRepository::new(),
        users,
    );

    let err = service
        .create_offer(UserId::new(2), draft("0.00"))
        .await
        .expect_err("zero amount");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn missing_wish_is_not_found() {
    let mut wishes = MockWishRepository::new();
    wishes.expect_find_by_id().returning(|_| Ok(None));
    let service = make_service(MockOfferRepository::new(), wishes, any_user());

    let err = service
        .create_offer(UserId::new(2), draft("1.00"))
        .await
        .expect_err("missing wish");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn missing_contributor_is_not_found() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));
    let service = make_service(
        MockOfferRepository::new(),
        wish_store("300.00", "0"),
        users,
    );

    let err = service
        .create_offer(UserId::new(2), draft("1.00"))
        .await
        .expect_err("missing user");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn conflict_rereads_wish_and_rechecks_cap() {
    let mut wishes = MockWishRepository::new();
    let mut seq = mockall::Sequence::new();
    wishes
        .expect_find_by_id()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(Some(sample_wish(5, 1, 20_000, 10_000))));
    wishes
        .expect_find_by_id()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            let mut wish = sample_wish(5, 1, 20_000, 19_000);
            wish.revision = 1;
            Ok(Some(wish))
        });
    let mut offers = MockOfferRepository::new();
    offers
        .expect_fund()
        .times(1)
        .returning(|_| Err(OfferRepositoryError::revision_mismatch(0_u32, 1_u32)));
    let service = make_service(offers, wishes, any_user());

    let err = service
        .create_offer(UserId::new(2), draft("50.00"))
        .await
        .expect_err("fresh state no longer fits");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn persistent_conflicts_surface_as_service_unavailable() {
    let mut offers = MockOfferRepository::new();
    offers
        .expect_fund()
        .times(3)
        .returning(|_| Err(OfferRepositoryError::revision_mismatch(0_u32, 1_u32)));
    let service = make_service(offers, wish_store("300.00", "0"), any_user());

    let err = service
        .create_offer(UserId::new(2), draft("1.00"))
        .await
        .expect_err("exhausted");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn get_offer_resolves_user_and_item() {
    let mut offers = MockOfferRepository::new();
    offers
        .expect_find_by_id()
        .returning(|_| Ok(Some(sample_offer(11, 2, 5, 5_000, true))));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_ids()
        .returning(|_| Ok(vec![sample_user(2, "bob")]));
    let mut wishes = MockWishRepository::new();
    wishes
        .expect_find_by_ids()
        .returning(|_| Ok(vec![sample_wish(5, 1, 30_000, 5_000)]));
    let service = make_service(offers, wishes, users);

    let details = service
        .get_offer(OfferId::new(11))
        .await
        .expect("offer found");

    assert_eq!(details.user.username, "bob");
    assert_eq!(details.item.id, WishId::new(5));
}

#[tokio::test]
async fn get_offer_reports_missing_offer() {
    let mut offers = MockOfferRepository::new();
    offers.expect_find_by_id().returning(|_| Ok(None));
    let service = make_service(offers, MockWishRepository::new(), MockUserRepository::new());

    let err = service
        .get_offer(OfferId::new(404))
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Offer not found");
}
