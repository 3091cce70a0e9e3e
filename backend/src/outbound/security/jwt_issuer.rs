//! HS256 JSON Web Token implementation of the [`TokenIssuer`] port.
//!
//! Claims are `{sub, username, iat, exp}`, with `sub` the decimal user id as
//! a string (the registered claim is a string). Expiry is checked against the
//! injected clock rather than the system time so tests can move time.

use std::sync::Arc;

use chrono::TimeDelta;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenError, TokenIssuer};
use crate::domain::{AccessToken, AuthClaims, UserId};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl JwtTokenIssuer {
    pub fn new(secret: &[u8], lifetime: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime,
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared with the injected clock below.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, claims: &AuthClaims) -> Result<AccessToken, TokenError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at + self.lifetime;
        let payload = Claims {
            sub: claims.user_id.get().to_string(),
            username: claims.username.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Self::validation()).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            }
        })?;
        let claims = data.claims;
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::invalid("subject is not a user id"))?;
        Ok(AuthClaims {
            user_id: UserId::new(user_id),
            username: claims.username,
        })
    }
}
