//! Wishlist handlers. Every route requires a bearer token.
//!
//! ```text
//! GET    /api/v1/wishlists
//! POST   /api/v1/wishlists        {"name":"Birthday","image":"https://…","itemsId":[5,6]}
//! GET    /api/v1/wishlists/{id}
//! PATCH  /api/v1/wishlists/{id}   {"itemsId":[6]}
//! DELETE /api/v1/wishlists/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, WishId, WishlistDraft, WishlistId, WishlistPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::WishlistBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, WISHLIST_DESCRIPTION_LENGTH, WISHLIST_NAME_LENGTH, check_length, check_optional,
    check_url,
};

const NAME: FieldName = FieldName::new("name");
const DESCRIPTION: FieldName = FieldName::new("description");
const IMAGE: FieldName = FieldName::new("image");

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateWishlistRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: String,
    /// Wish ids to include; unknown ids are dropped.
    #[serde(default)]
    #[schema(value_type = Vec<i64>)]
    pub items_id: Vec<WishId>,
}

impl TryFrom<CreateWishlistRequest> for WishlistDraft {
    type Error = Error;

    fn try_from(value: CreateWishlistRequest) -> Result<Self, Self::Error> {
        check_length(&value.name, NAME, &WISHLIST_NAME_LENGTH)?;
        check_length(&value.description, DESCRIPTION, &WISHLIST_DESCRIPTION_LENGTH)?;
        check_url(&value.image, IMAGE)?;
        Ok(Self {
            name: value.name,
            description: value.description,
            image: value.image,
            item_ids: value.items_id,
        })
    }
}

/// Partial update. `itemsId`, when present, replaces the whole item set.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateWishlistRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<i64>>)]
    pub items_id: Option<Vec<WishId>>,
}

impl TryFrom<UpdateWishlistRequest> for WishlistPatch {
    type Error = Error;

    fn try_from(value: UpdateWishlistRequest) -> Result<Self, Self::Error> {
        check_optional(value.name.as_deref(), |name| {
            check_length(name, NAME, &WISHLIST_NAME_LENGTH)
        })?;
        check_optional(value.description.as_deref(), |description| {
            check_length(description, DESCRIPTION, &WISHLIST_DESCRIPTION_LENGTH)
        })?;
        check_optional(value.image.as_deref(), |image| check_url(image, IMAGE))?;
        Ok(Self {
            name: value.name,
            description: value.description,
            image: value.image,
            item_ids: value.items_id,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/wishlists",
    responses(
        (status = 200, description = "The caller's wishlists", body = [WishlistBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["wishlists"],
    operation_id = "listWishlists"
)]
#[get("/wishlists")]
pub async fn list_wishlists(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<WishlistBody>>> {
    let wishlists = state.wishlists.list(user.id()).await?;
    Ok(web::Json(
        wishlists.into_iter().map(WishlistBody::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/wishlists",
    request_body = CreateWishlistRequest,
    responses(
        (status = 201, description = "Wishlist created", body = WishlistBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["wishlists"],
    operation_id = "createWishlist"
)]
#[post("/wishlists")]
pub async fn create_wishlist(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateWishlistRequest>,
) -> ApiResult<HttpResponse> {
    let draft = WishlistDraft::try_from(payload.into_inner())?;
    let wishlist = state.wishlists.create(user.id(), draft).await?;
    Ok(HttpResponse::Created().json(WishlistBody::from(wishlist)))
}

#[utoipa::path(
    get,
    path = "/api/v1/wishlists/{id}",
    params(("id" = i64, Path, description = "Wishlist id")),
    responses(
        (status = 200, description = "Wishlist", body = WishlistBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Wishlist not found", body = ErrorSchema)
    ),
    tags = ["wishlists"],
    operation_id = "getWishlist"
)]
#[get("/wishlists/{id}")]
pub async fn get_wishlist(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<WishlistBody>> {
    let wishlist = state
        .wishlists
        .get(WishlistId::new(path.into_inner()))
        .await?;
    Ok(web::Json(WishlistBody::from(wishlist)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/wishlists/{id}",
    params(("id" = i64, Path, description = "Wishlist id")),
    request_body = UpdateWishlistRequest,
    responses(
        (status = 200, description = "Updated wishlist", body = WishlistBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Wishlist not found", body = ErrorSchema)
    ),
    tags = ["wishlists"],
    operation_id = "updateWishlist"
)]
#[patch("/wishlists/{id}")]
pub async fn update_wishlist(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateWishlistRequest>,
) -> ApiResult<web::Json<WishlistBody>> {
    let patch = WishlistPatch::try_from(payload.into_inner())?;
    let wishlist = state
        .wishlists
        .update(user.id(), WishlistId::new(path.into_inner()), patch)
        .await?;
    Ok(web::Json(WishlistBody::from(wishlist)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/wishlists/{id}",
    params(("id" = i64, Path, description = "Wishlist id")),
    responses(
        (status = 204, description = "Wishlist deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Wishlist not found", body = ErrorSchema)
    ),
    tags = ["wishlists"],
    operation_id = "deleteWishlist"
)]
#[delete("/wishlists/{id}")]
pub async fn delete_wishlist(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .wishlists
        .delete(user.id(), WishlistId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
