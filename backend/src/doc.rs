//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `/api/v1`, the health probes, the
//! request and response bodies, and the bearer security scheme. Swagger UI
//! serves it in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::dto::{
    OfferBody, OfferSummaryBody, ProfileBody, PublicUserBody, WishBody, WishDetailsBody,
    WishlistBody,
};
use crate::inbound::http::offers::{CreateOfferRequest, CreatedOfferBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, MoneySchema};
use crate::inbound::http::users::{
    FindUsersRequest, SignInRequest, SignInResponse, SignUpRequest, UpdateProfileRequest,
};
use crate::inbound::http::wishes::{CreateWishRequest, UpdateWishRequest};
use crate::inbound::http::wishlists::{CreateWishlistRequest, UpdateWishlistRequest};

/// Name of the bearer scheme referenced by `security(...)` annotations.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the JWT bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /api/v1/signin."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Wishlist backend API",
        description = "Wishes, crowdfunding offers and wishlists."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::sign_up,
        crate::inbound::http::users::sign_in,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::current_user_wishes,
        crate::inbound::http::users::user_by_username,
        crate::inbound::http::users::wishes_by_username,
        crate::inbound::http::users::find_users,
        crate::inbound::http::wishes::create_wish,
        crate::inbound::http::wishes::last_wishes,
        crate::inbound::http::wishes::top_wishes,
        crate::inbound::http::wishes::get_wish,
        crate::inbound::http::wishes::update_wish,
        crate::inbound::http::wishes::delete_wish,
        crate::inbound::http::wishes::copy_wish,
        crate::inbound::http::offers::create_offer,
        crate::inbound::http::offers::list_offers,
        crate::inbound::http::offers::get_offer,
        crate::inbound::http::wishlists::list_wishlists,
        crate::inbound::http::wishlists::create_wishlist,
        crate::inbound::http::wishlists::get_wishlist,
        crate::inbound::http::wishlists::update_wishlist,
        crate::inbound::http::wishlists::delete_wishlist,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        MoneySchema,
        SignUpRequest,
        SignInRequest,
        SignInResponse,
        UpdateProfileRequest,
        FindUsersRequest,
        CreateWishRequest,
        UpdateWishRequest,
        CreateOfferRequest,
        CreatedOfferBody,
        CreateWishlistRequest,
        UpdateWishlistRequest,
        PublicUserBody,
        ProfileBody,
        WishBody,
        WishDetailsBody,
        OfferSummaryBody,
        OfferBody,
        WishlistBody,
    )),
    tags(
        (name = "auth", description = "Sign-up and sign-in"),
        (name = "users", description = "Profiles and user lookup"),
        (name = "wishes", description = "Wishes, listings and copies"),
        (name = "offers", description = "Funding pledges"),
        (name = "wishlists", description = "Named collections of wishes"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
