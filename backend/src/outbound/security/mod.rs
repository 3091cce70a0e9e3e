//! Credential adapters: Argon2id password digests and HS256 bearer tokens.

mod argon2_hasher;
mod jwt_issuer;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_issuer::JwtTokenIssuer;
