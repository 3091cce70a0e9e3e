//! One-way password hashing collaborator.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Digest could not be produced or parsed.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// Hashes and verifies passwords. Implementations run the CPU-heavy work off
/// the async executor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a self-describing digest (PHC string) for `plaintext`.
    async fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError>;

    /// Whether `plaintext` matches `digest`. A mismatch is `Ok(false)`.
    async fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordHashError>;
}
