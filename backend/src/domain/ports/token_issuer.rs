//! Signed session token boundary.

use crate::domain::{AccessToken, AuthClaims};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// Token signature was valid but its lifetime has passed.
        Expired => "token expired",
        /// Token is malformed, tampered with or carries bad claims.
        Invalid { message: String } => "invalid token: {message}",
        /// Token could not be signed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Issues and verifies time-limited bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a token for `claims` that expires after the configured lifetime.
    fn issue(&self, claims: &AuthClaims) -> Result<AccessToken, TokenError>;

    /// Verify signature and expiry, returning the embedded claims.
    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError>;
}
