//! Account and user directory handlers.
//!
//! ```text
//! POST  /api/v1/signup                 {"username":"alice","email":"alice@example.com","password":"secret1"}
//! POST  /api/v1/signin                 {"username":"alice","password":"secret1"}
//! GET   /api/v1/users/me
//! PATCH /api/v1/users/me               {"about":"likes bikes"}
//! GET   /api/v1/users/me/wishes
//! GET   /api/v1/users/{username}
//! GET   /api/v1/users/{username}/wishes
//! POST  /api/v1/users/find             {"query":"alice@example.com"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use zeroize::Zeroizing;

use crate::domain::{Error, LoginCredentials, LoginValidationError, ProfileUpdate, Registration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{ProfileBody, PublicUserBody, WishBody, wish_bodies};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ABOUT_LENGTH, FieldName, PASSWORD_LENGTH, USERNAME_LENGTH, check_email, check_length,
    check_optional, check_url,
};

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");
const ABOUT: FieldName = FieldName::new("about");
const AVATAR: FieldName = FieldName::new("avatar");

/// Sign-up request body for `POST /api/v1/signup`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl TryFrom<SignUpRequest> for Registration {
    type Error = Error;

    fn try_from(value: SignUpRequest) -> Result<Self, Self::Error> {
        check_length(&value.username, USERNAME, &USERNAME_LENGTH)?;
        check_email(&value.email, EMAIL)?;
        check_length(&value.password, PASSWORD, &PASSWORD_LENGTH)?;
        check_optional(value.about.as_deref(), |about| {
            check_length(about, ABOUT, &ABOUT_LENGTH)
        })?;
        check_optional(value.avatar.as_deref(), |avatar| check_url(avatar, AVATAR))?;
        Ok(Self {
            username: value.username,
            email: value.email,
            password: Zeroizing::new(value.password),
            about: value.about,
            avatar: value.avatar,
        })
    }
}

/// Sign-in request body for `POST /api/v1/signin`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<SignInRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: SignInRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Bearer token returned by `POST /api/v1/signin`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
}

/// Partial profile update for `PATCH /api/v1/users/me`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl TryFrom<UpdateProfileRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: UpdateProfileRequest) -> Result<Self, Self::Error> {
        check_optional(value.username.as_deref(), |username| {
            check_length(username, USERNAME, &USERNAME_LENGTH)
        })?;
        check_optional(value.email.as_deref(), |email| check_email(email, EMAIL))?;
        check_optional(value.password.as_deref(), |password| {
            check_length(password, PASSWORD, &PASSWORD_LENGTH)
        })?;
        check_optional(value.about.as_deref(), |about| {
            check_length(about, ABOUT, &ABOUT_LENGTH)
        })?;
        check_optional(value.avatar.as_deref(), |avatar| check_url(avatar, AVATAR))?;
        Ok(Self {
            username: value.username,
            email: value.email,
            password: value.password.map(Zeroizing::new),
            about: value.about,
            avatar: value.avatar,
        })
    }
}

/// Exact-match lookup body for `POST /api/v1/users/find`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FindUsersRequest {
    /// Username or e-mail address.
    pub query: String,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": err.reason() }))
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = ProfileBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username or email already exists", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/signup")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<SignUpRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let user = state.credentials.sign_up(registration).await?;
    Ok(HttpResponse::Created().json(ProfileBody::from(user)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/signin")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    payload: web::Json<SignInRequest>,
) -> ApiResult<web::Json<SignInResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let token = state.credentials.sign_in(&credentials).await?;
    Ok(web::Json(SignInResponse {
        access_token: token.as_str().to_owned(),
    }))
}

/// Current user's profile, including the e-mail address.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = ProfileBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<ProfileBody>> {
    let profile = state.users.me(user.id()).await?;
    Ok(web::Json(ProfileBody::from(profile)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Username or email already exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<ProfileBody>> {
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let profile = state.users.update_me(user.id(), update).await?;
    Ok(web::Json(ProfileBody::from(profile)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me/wishes",
    responses(
        (status = 200, description = "Wishes owned by the caller", body = [WishBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUserWishes"
)]
#[get("/users/me/wishes")]
pub async fn current_user_wishes(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<WishBody>>> {
    let wishes = state.users.wishes_of(user.id()).await?;
    Ok(web::Json(wish_bodies(wishes)))
}

/// Public profile by username.
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Exact username")),
    responses(
        (status = 200, description = "Public profile", body = PublicUserBody),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "userByUsername",
    security([])
)]
#[get("/users/{username}")]
pub async fn user_by_username(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PublicUserBody>> {
    let user = state.users.by_username(&path).await?;
    Ok(web::Json(PublicUserBody::from(&user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{username}/wishes",
    params(("username" = String, Path, description = "Exact username")),
    responses(
        (status = 200, description = "Wishes owned by the user", body = [WishBody]),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "wishesByUsername",
    security([])
)]
#[get("/users/{username}/wishes")]
pub async fn wishes_by_username(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<WishBody>>> {
    let wishes = state.users.wishes_by_username(&path).await?;
    Ok(web::Json(wish_bodies(wishes)))
}

/// Users whose username or e-mail equals the query.
#[utoipa::path(
    post,
    path = "/api/v1/users/find",
    request_body = FindUsersRequest,
    responses(
        (status = 200, description = "Matching users", body = [PublicUserBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "findUsers",
    security([])
)]
#[post("/users/find")]
pub async fn find_users(
    state: web::Data<HttpState>,
    payload: web::Json<FindUsersRequest>,
) -> ApiResult<web::Json<Vec<PublicUserBody>>> {
    let users = state.users.find(payload.query.trim()).await?;
    Ok(web::Json(users.iter().map(PublicUserBody::from).collect()))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
