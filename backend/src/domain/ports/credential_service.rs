//! Driving port for registration, sign-in and bearer token checks.
//!
//! Inbound adapters call this port without knowing how digests are stored or
//! how tokens are signed, so handler tests can substitute a mock.

use async_trait::async_trait;

use crate::domain::{AccessToken, AuthClaims, Error, LoginCredentials, Registration, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Register a new user. Conflict when the username or e-mail is taken.
    async fn sign_up(&self, registration: Registration) -> Result<User, Error>;

    /// Verify credentials and issue an access token. Unauthorized on mismatch.
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error>;

    /// Verify a bearer token. Unauthorized when missing, invalid or expired.
    fn authenticate(&self, token: &str) -> Result<AuthClaims, Error>;
}
