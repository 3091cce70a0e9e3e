//! Offer handlers.
//!
//! ```text
//! POST /api/v1/offers       {"itemId":5,"amount":"50.00","hidden":false}
//! GET  /api/v1/offers
//! GET  /api/v1/offers/{id}
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Money, Offer, OfferDraft, OfferId, UserId, WishId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::dto::OfferBody;
use crate::inbound::http::schemas::{ErrorSchema, MoneySchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, check_positive};

const AMOUNT: FieldName = FieldName::new("amount");

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOfferRequest {
    #[schema(value_type = i64, example = 5)]
    pub item_id: WishId,
    #[schema(value_type = MoneySchema, example = "50.00")]
    pub amount: Money,
    /// Hide the amount and contributor from everyone but the wish owner.
    #[serde(default)]
    pub hidden: bool,
}

impl TryFrom<CreateOfferRequest> for OfferDraft {
    type Error = Error;

    fn try_from(value: CreateOfferRequest) -> Result<Self, Self::Error> {
        check_positive(value.amount, AMOUNT)?;
        Ok(Self {
            item_id: value.item_id,
            amount: value.amount,
            hidden: value.hidden,
        })
    }
}

/// The stored offer, as seen by its contributor.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOfferBody {
    #[schema(value_type = i64)]
    pub id: OfferId,
    #[schema(value_type = i64)]
    pub item_id: WishId,
    #[schema(value_type = i64)]
    pub user_id: UserId,
    #[schema(value_type = MoneySchema, example = "50.00")]
    pub amount: Money,
    pub hidden: bool,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<Offer> for CreatedOfferBody {
    fn from(offer: Offer) -> Self {
        Self {
            id: offer.id,
            item_id: offer.item_id,
            user_id: offer.user_id,
            amount: offer.amount,
            hidden: offer.hidden,
            created_at: offer.created_at,
        }
    }
}

/// Pledge money towards someone else's wish.
///
/// The amount may not push the wish's raised total above its price.
#[utoipa::path(
    post,
    path = "/api/v1/offers",
    request_body = CreateOfferRequest,
    responses(
        (status = 201, description = "Offer recorded", body = CreatedOfferBody),
        (status = 400, description = "Invalid amount or price exceeded", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Offer on own wish", body = ErrorSchema),
        (status = 404, description = "Wish or user not found", body = ErrorSchema),
        (status = 503, description = "Too much contention, retry later", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "createOffer"
)]
#[post("/offers")]
pub async fn create_offer(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateOfferRequest>,
) -> ApiResult<HttpResponse> {
    let draft = OfferDraft::try_from(payload.into_inner())?;
    let offer = state.offers.create_offer(user.id(), draft).await?;
    Ok(HttpResponse::Created().json(CreatedOfferBody::from(offer)))
}

#[utoipa::path(
    get,
    path = "/api/v1/offers",
    responses((status = 200, description = "All offers", body = [OfferBody])),
    tags = ["offers"],
    operation_id = "listOffers",
    security([], ("BearerAuth" = []))
)]
#[get("/offers")]
pub async fn list_offers(
    state: web::Data<HttpState>,
    viewer: OptionalUser,
) -> ApiResult<web::Json<Vec<OfferBody>>> {
    let offers = state.offers.list_offers().await?;
    let viewer = viewer.id();
    Ok(web::Json(
        offers
            .into_iter()
            .map(|details| OfferBody::for_viewer(details, viewer))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/offers/{id}",
    params(("id" = i64, Path, description = "Offer id")),
    responses(
        (status = 200, description = "Offer", body = OfferBody),
        (status = 404, description = "Offer not found", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "getOffer",
    security([], ("BearerAuth" = []))
)]
#[get("/offers/{id}")]
pub async fn get_offer(
    state: web::Data<HttpState>,
    viewer: OptionalUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<OfferBody>> {
    let details = state
        .offers
        .get_offer(OfferId::new(path.into_inner()))
        .await?;
    Ok(web::Json(OfferBody::for_viewer(details, viewer.id())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::OfferDetails;
    use crate::inbound::http::test_utils::{ALICE_TOKEN, BOB_TOKEN, StatePorts, bearer, test_app};
    use crate::test_support::{sample_offer, sample_user, sample_wish};

    async fn send(ports: StatePorts, req: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(test_app(ports)).await;
        let res = actix_test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body = actix_test::read_body(res).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn hidden_details() -> OfferDetails {
        OfferDetails {
            offer: sample_offer(9, 2, 5, 5_000, true),
            user: sample_user(2, "bob"),
            item: sample_wish(5, 1, 30_000, 5_000),
        }
    }

    #[actix_web::test]
    async fn create_offer_forwards_draft() {
        let mut ports = StatePorts::with_known_tokens();
        ports
            .offers
            .expect_create_offer()
            .with(
                eq(UserId::new(2)),
                eq(OfferDraft {
                    item_id: WishId::new(5),
                    amount: Money::from_cents(10_000),
                    hidden: false,
                }),
            )
            .times(1)
            .returning(|_, _| Ok(sample_offer(1, 2, 5, 10_000, false)));

        let (status, body) = send(
            ports,
            actix_test::TestRequest::post()
                .uri("/api/v1/offers")
                .insert_header(bearer(BOB_TOKEN))
                .set_json(json!({"itemId": 5, "amount": 100})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["amount"], "100.00");
        assert_eq!(body["itemId"], 5);
        assert_eq!(body["hidden"], false);
    }

    #[actix_web::test]
    async fn zero_amount_is_rejected_before_the_engine() {
        let mut ports = StatePorts::with_known_tokens();
        ports.offers.expect_create_offer().times(0);

        let (status, body) = send(
            ports,
            actix_test::TestRequest::post()
                .uri("/api/v1/offers")
                .insert_header(bearer(BOB_TOKEN))
                .set_json(json!({"itemId": 5, "amount": "0.00"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "amount");
    }

    #[rstest]
    #[case(Error::forbidden("You cannot fund your own wish"), StatusCode::FORBIDDEN)]
    #[case(Error::invalid_request("Offer exceeds the remaining price"), StatusCode::BAD_REQUEST)]
    #[case(Error::not_found("Wish not found"), StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn engine_errors_map_to_status(#[case] error: Error, #[case] expected: StatusCode) {
        let mut ports = StatePorts::with_known_tokens();
        ports
            .offers
            .expect_create_offer()
            .return_once(move |_, _| Err(error));

        let (status, _) = send(
            ports,
            actix_test::TestRequest::post()
                .uri("/api/v1/offers")
                .insert_header(bearer(ALICE_TOKEN))
                .set_json(json!({"itemId": 5, "amount": "50.00"})),
        )
        .await;

        assert_eq!(status, expected);
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some(BOB_TOKEN), true)]
    #[case(Some(ALICE_TOKEN), true)]
    #[actix_web::test]
    async fn listed_offers_redact_hidden_entries(
        #[case] token: Option<&str>,
        #[case] disclosed: bool,
    ) {
        let mut ports = StatePorts::with_known_tokens();
        ports
            .offers
            .expect_list_offers()
            .returning(|| Ok(vec![hidden_details()]));
        let mut req = actix_test::TestRequest::get().uri("/api/v1/offers");
        if let Some(token) = token {
            req = req.insert_header(bearer(token));
        }

        let (status, body) = send(ports, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["item"]["id"], 5);
        assert_eq!(body[0].get("amount").is_some(), disclosed);
        assert_eq!(body[0].get("user").is_some(), disclosed);
    }

    #[actix_web::test]
    async fn missing_offer_is_not_found() {
        let mut ports = StatePorts::default();
        ports
            .offers
            .expect_get_offer()
            .with(eq(OfferId::new(42)))
            .returning(|_| Err(Error::not_found("Offer not found")));

        let (status, body) = send(
            ports,
            actix_test::TestRequest::get().uri("/api/v1/offers/42"),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Offer not found");
    }
}
