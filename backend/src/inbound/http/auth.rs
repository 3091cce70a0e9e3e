//! Bearer token extraction.
//!
//! Handlers take [`AuthenticatedUser`] when a valid token is mandatory and
//! [`OptionalUser`] on public reads, where the viewer only decides offer
//! redaction. Token verification is delegated to the credential port held in
//! [`HttpState`].

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{AuthClaims, Error, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Caller identity proven by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(AuthClaims);

impl AuthenticatedUser {
    pub fn id(&self) -> UserId {
        self.0.user_id
    }

    pub fn username(&self) -> &str {
        self.0.username.as_str()
    }
}

/// Viewer identity on public endpoints.
///
/// A missing, malformed or expired token yields an anonymous viewer rather
/// than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionalUser(Option<AuthClaims>);

impl OptionalUser {
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|claims| claims.user_id)
    }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<&str>, Error> {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| Error::unauthorized("Authorization header is not valid ASCII"))?;
    let token = raw
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("Authorization header must use the Bearer scheme"))?;
    Ok(Some(token))
}

fn verify(req: &HttpRequest, token: &str) -> Result<AuthClaims, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    state.credentials.authenticate(token)
}

fn require_claims(req: &HttpRequest) -> Result<AuthClaims, Error> {
    let token = bearer_token(req)?.ok_or_else(|| Error::unauthorized("Bearer token required"))?;
    verify(req, token)
}

fn optional_claims(req: &HttpRequest) -> Option<AuthClaims> {
    let token = match bearer_token(req) {
        Ok(token) => token?,
        Err(error) => {
            debug!(%error, "ignoring malformed authorization header");
            return None;
        }
    };
    match verify(req, token) {
        Ok(claims) => Some(claims),
        Err(error) => {
            debug!(%error, "treating request with rejected token as anonymous");
            None
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(require_claims(req).map(Self))
    }
}

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(optional_claims(req))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;

    use crate::domain::ErrorCode;
    use crate::inbound::http::test_utils::{StatePorts, claims_for};

    fn state_accepting(token: &'static str) -> HttpState {
        let mut ports = StatePorts::default();
        ports
            .credentials
            .expect_authenticate()
            .returning(move |presented| {
                if presented == token {
                    Ok(claims_for(7, "alice"))
                } else {
                    Err(Error::unauthorized("Invalid token"))
                }
            });
        ports.into_state()
    }

    async fn call(path: &str, header: Option<&str>) -> (StatusCode, String) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_accepting("good")))
                .route(
                    "/required",
                    web::get().to(|user: AuthenticatedUser| async move {
                        HttpResponse::Ok().body(user.id().to_string())
                    }),
                )
                .route(
                    "/optional",
                    web::get().to(|viewer: OptionalUser| async move {
                        let body = viewer
                            .id()
                            .map_or_else(|| "anonymous".to_owned(), |id| id.to_string());
                        HttpResponse::Ok().body(body)
                    }),
                ),
        )
        .await;
        let mut req = test::TestRequest::get().uri(path);
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic Zm9vOmJhcg=="))]
    #[case(Some("Bearer "))]
    #[case(Some("Bearer bad"))]
    #[actix_web::test]
    async fn required_rejects_missing_or_invalid_tokens(#[case] header: Option<&str>) {
        let (status, body) = call("/required", header).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let payload: Error = serde_json::from_str(&body).expect("error payload");
        assert_eq!(payload.code(), ErrorCode::Unauthorized);
    }

    #[actix_web::test]
    async fn required_accepts_valid_token() {
        let (status, body) = call("/required", Some("Bearer good")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "7");
    }

    #[rstest]
    #[case(None, "anonymous")]
    #[case(Some("Bearer bad"), "anonymous")]
    #[case(Some("Token good"), "anonymous")]
    #[case(Some("Bearer good"), "7")]
    #[actix_web::test]
    async fn optional_never_rejects(#[case] header: Option<&str>, #[case] expected: &str) {
        let (status, body) = call("/optional", header).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, expected);
    }
}
