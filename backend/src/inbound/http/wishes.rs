//! Wish handlers.
//!
//! ```text
//! POST   /api/v1/wishes            {"name":"Bike","link":"https://…","image":"https://…","description":"Red","price":"300.00"}
//! GET    /api/v1/wishes/last
//! GET    /api/v1/wishes/top
//! GET    /api/v1/wishes/{id}
//! PATCH  /api/v1/wishes/{id}       {"price":"250.00"}
//! DELETE /api/v1/wishes/{id}
//! POST   /api/v1/wishes/{id}/copy
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Money, WishDraft, WishId, WishPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::dto::{WishBody, WishDetailsBody, wish_bodies};
use crate::inbound::http::schemas::{ErrorSchema, MoneySchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, WISH_DESCRIPTION_LENGTH, WISH_NAME_LENGTH, check_length, check_optional, check_url,
};

const NAME: FieldName = FieldName::new("name");
const LINK: FieldName = FieldName::new("link");
const IMAGE: FieldName = FieldName::new("image");
const DESCRIPTION: FieldName = FieldName::new("description");

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateWishRequest {
    pub name: String,
    pub link: String,
    pub image: String,
    pub description: String,
    /// Decimal amount with at most two fractional digits, as number or string.
    #[schema(value_type = MoneySchema, example = "300.00")]
    pub price: Money,
}

impl TryFrom<CreateWishRequest> for WishDraft {
    type Error = Error;

    fn try_from(value: CreateWishRequest) -> Result<Self, Self::Error> {
        check_length(&value.name, NAME, &WISH_NAME_LENGTH)?;
        check_url(&value.link, LINK)?;
        check_url(&value.image, IMAGE)?;
        check_length(&value.description, DESCRIPTION, &WISH_DESCRIPTION_LENGTH)?;
        Ok(Self {
            name: value.name,
            link: value.link,
            image: value.image,
            description: value.description,
            price: value.price,
        })
    }
}

/// Owner edit. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateWishRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<MoneySchema>)]
    pub price: Option<Money>,
    #[serde(default)]
    #[schema(value_type = Option<MoneySchema>)]
    pub raised: Option<Money>,
}

impl TryFrom<UpdateWishRequest> for WishPatch {
    type Error = Error;

    fn try_from(value: UpdateWishRequest) -> Result<Self, Self::Error> {
        check_optional(value.name.as_deref(), |name| {
            check_length(name, NAME, &WISH_NAME_LENGTH)
        })?;
        check_optional(value.link.as_deref(), |link| check_url(link, LINK))?;
        check_optional(value.image.as_deref(), |image| check_url(image, IMAGE))?;
        check_optional(value.description.as_deref(), |description| {
            check_length(description, DESCRIPTION, &WISH_DESCRIPTION_LENGTH)
        })?;
        Ok(Self {
            name: value.name,
            link: value.link,
            image: value.image,
            description: value.description,
            price: value.price,
            raised: value.raised,
        })
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/wishes",
    request_body = CreateWishRequest,
    responses(
        (status = 201, description = "Wish created", body = WishBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Owner not found", body = ErrorSchema)
    ),
    tags = ["wishes"],
    operation_id = "createWish"
)]
#[post("/wishes")]
pub async fn create_wish(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateWishRequest>,
) -> ApiResult<HttpResponse> {
    let draft = WishDraft::try_from(payload.into_inner())?;
    let wish = state.wishes.create_wish(user.id(), draft).await?;
    Ok(HttpResponse::Created().json(WishBody::from(wish)))
}

/// The ten most recently created wishes.
#[utoipa::path(
    get,
    path = "/api/v1/wishes/last",
    responses((status = 200, description = "Recent wishes", body = [WishBody])),
    tags = ["wishes"],
    operation_id = "lastWishes",
    security([])
)]
#[get("/wishes/last")]
pub async fn last_wishes(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<WishBody>>> {
    let wishes = state.wishes.list_recent().await?;
    Ok(web::Json(wish_bodies(wishes)))
}

/// The ten most copied wishes.
#[utoipa::path(
    get,
    path = "/api/v1/wishes/top",
    responses((status = 200, description = "Most copied wishes", body = [WishBody])),
    tags = ["wishes"],
    operation_id = "topWishes",
    security([])
)]
#[get("/wishes/top")]
pub async fn top_wishes(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<WishBody>>> {
    let wishes = state.wishes.list_top().await?;
    Ok(web::Json(wish_bodies(wishes)))
}

/// A wish with its owner and offers.
///
/// A bearer token is optional; it only unlocks hidden offers for their
/// contributor and the wish owner.
#[utoipa::path(
    get,
    path = "/api/v1/wishes/{id}",
    params(("id" = i64, Path, description = "Wish id")),
    responses(
        (status = 200, description = "Wish", body = WishDetailsBody),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "Wish not found", body = ErrorSchema)
    ),
    tags = ["wishes"],
    operation_id = "getWish",
    security([], ("BearerAuth" = []))
)]
#[get("/wishes/{id}")]
pub async fn get_wish(
    state: web::Data<HttpState>,
    viewer: OptionalUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<WishDetailsBody>> {
    let details = state.wishes.get_wish(WishId::new(path.into_inner())).await?;
    Ok(web::Json(WishDetailsBody::for_viewer(details, viewer.id())))
}

#[utoipa::path(
    patch,
    path = "/api/v1/wishes/{id}",
    params(("id" = i64, Path, description = "Wish id")),
    request_body = UpdateWishRequest,
    responses(
        (status = 200, description = "Updated wish", body = WishBody),
        (status = 400, description = "Invalid request or funding bounds broken", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Wish not found", body = ErrorSchema)
    ),
    tags = ["wishes"],
    operation_id = "updateWish"
)]
#[patch("/wishes/{id}")]
pub async fn update_wish(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateWishRequest>,
) -> ApiResult<web::Json<WishBody>> {
    let patch = WishPatch::try_from(payload.into_inner())?;
    let wish = state
        .wishes
        .update_wish(user.id(), WishId::new(path.into_inner()), patch)
        .await?;
    Ok(web::Json(WishBody::from(wish)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/wishes/{id}",
    params(("id" = i64, Path, description = "Wish id")),
    responses(
        (status = 204, description = "Wish deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Wish not found", body = ErrorSchema)
    ),
    tags = ["wishes"],
    operation_id = "deleteWish"
)]
#[delete("/wishes/{id}")]
pub async fn delete_wish(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .wishes
        .delete_wish(user.id(), WishId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Copy someone's wish into the caller's own list.
#[utoipa::path(
    post,
    path = "/api/v1/wishes/{id}/copy",
    params(("id" = i64, Path, description = "Source wish id")),
    responses(
        (status = 201, description = "Copy created", body = WishBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Wish not found", body = ErrorSchema),
        (status = 409, description = "Already copied", body = ErrorSchema),
        (status = 503, description = "Too much contention, retry later", body = ErrorSchema)
    ),
    tags = ["wishes"],
    operation_id = "copyWish"
)]
#[post("/wishes/{id}/copy")]
pub async fn copy_wish(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let copy = state
        .wishes
        .copy_wish(user.id(), WishId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(WishBody::from(copy)))
}

#[cfg(test)]
#[path = "wishes_tests.rs"]
mod tests;
