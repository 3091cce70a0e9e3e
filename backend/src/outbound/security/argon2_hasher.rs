//! Argon2id implementation of the [`PasswordHasher`] port.
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as PhcError, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id hasher with configurable memory (KiB) and time cost.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// # Errors
    ///
    /// Returns [`PasswordHashError::Hash`] when the costs are outside what
    /// Argon2 accepts.
    pub fn new(memory_kib: u32, time_cost: u32) -> Result<Self, PasswordHashError> {
        let params = Params::new(memory_kib, time_cost, Params::DEFAULT_P_COST, None)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, PasswordHashError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasswordHashError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| PasswordHashError::hash(err.to_string()))?
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        let argon2 = self.argon2();
        let plaintext = Zeroizing::new(plaintext.to_owned());
        run_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|digest| digest.to_string())
                .map_err(|err| PasswordHashError::hash(err.to_string()))
        })
        .await
    }

    async fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordHashError> {
        let argon2 = self.argon2();
        let plaintext = Zeroizing::new(plaintext.to_owned());
        let digest = digest.to_owned();
        run_blocking(move || {
            let parsed =
                PasswordHash::new(&digest).map_err(|err| PasswordHashError::hash(err.to_string()))?;
            match argon2.verify_password(plaintext.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(PhcError::Password) => Ok(false),
                Err(err) => Err(PasswordHashError::hash(err.to_string())),
            }
        })
        .await
    }
}
