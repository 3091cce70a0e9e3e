//! Registration, sign-in and bearer token verification.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    CredentialService, PasswordHasher, TokenIssuer, UserPersistenceError, UserRepository,
};
use crate::domain::repository_errors::{
    DUPLICATE_USER, map_hash_error, map_token_error, map_user_error,
};
use crate::domain::{
    AccessToken, AuthClaims, DEFAULT_ABOUT, DEFAULT_AVATAR, Error, LoginCredentials, NewUser,
    Registration, User,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Credential service backed by the identity store, a hasher and a token
/// issuer.
#[derive(Clone)]
pub struct CredentialServiceImpl<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    clock: Arc<dyn Clock>,
}

impl<U> CredentialServiceImpl<U> {
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }
}

#[async_trait]
impl<U> CredentialService for CredentialServiceImpl<U>
where
    U: UserRepository,
{
    async fn sign_up(&self, registration: Registration) -> Result<User, Error> {
        let taken = self
            .users
            .exists(&registration.username, &registration.email)
            .await
            .map_err(map_user_error)?;
        if taken {
            return Err(Error::conflict(DUPLICATE_USER));
        }

        let password_hash = self
            .hasher
            .hash(registration.password.as_str())
            .await
            .map_err(map_hash_error)?;
        let new_user = NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
            about: registration
                .about
                .unwrap_or_else(|| DEFAULT_ABOUT.to_owned()),
            avatar: registration
                .avatar
                .unwrap_or_else(|| DEFAULT_AVATAR.to_owned()),
            created_at: self.clock.utc(),
        };

        match self.users.insert(new_user).await {
            Ok(user) => {
                info!(user_id = %user.id, "user registered");
                Ok(user)
            }
            Err(UserPersistenceError::Duplicate { .. }) => Err(Error::conflict(DUPLICATE_USER)),
            Err(err) => Err(map_user_error(err)),
        }
    }

    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error> {
        let Some(stored) = self
            .users
            .find_credentials(credentials.username())
            .await
            .map_err(map_user_error)?
        else {
            warn!("sign-in for unknown username");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            warn!(user_id = %stored.user_id, "sign-in with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        self.tokens
            .issue(&AuthClaims {
                user_id: stored.user_id,
                username: stored.username,
            })
            .map_err(map_token_error)
    }

    fn authenticate(&self, token: &str) -> Result<AuthClaims, Error> {
        self.tokens.verify(token).map_err(map_token_error)
    }
}

#[cfg(test)]
mod tests {
    use zeroize::Zeroizing;

    use super::*;
    use crate::domain::ports::{MockPasswordHasher, MockTokenIssuer, MockUserRepository, TokenError};
    use crate::domain::{ErrorCode, UserCredentials, UserId};
    use crate::test_support::{fixed_clock, sample_user};

    fn make_service(
        users: MockUserRepository,
        hasher: MockPasswordHasher,
        tokens: MockTokenIssuer,
    ) -> CredentialServiceImpl<MockUserRepository> {
        CredentialServiceImpl::new(
            Arc::new(users),
            Arc::new(hasher),
            Arc::new(tokens),
            fixed_clock(),
        )
    }

    fn registration() -> Registration {
        Registration {
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password: Zeroizing::new("hunter22".to_owned()),
            about: None,
            avatar: None,
        }
    }

    fn stored_credentials() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().returning(|username| {
            Ok((username == "alice").then(|| UserCredentials {
                user_id: UserId::new(1),
                username: "alice".to_owned(),
                password_hash: "$argon2id$stored".to_owned(),
            }))
        });
        users
    }

    #[tokio::test]
    async fn sign_up_applies_defaults_and_hashes() {
        let mut users = MockUserRepository::new();
        users.expect_exists().returning(|_, _| Ok(false));
        users.expect_insert().times(1).returning(|new_user| {
            assert_eq!(new_user.password_hash, "$argon2id$fresh");
            assert_eq!(new_user.about, DEFAULT_ABOUT);
            assert_eq!(new_user.avatar, DEFAULT_AVATAR);
            let mut user = sample_user(1, &new_user.username);
            user.email = new_user.email;
            Ok(user)
        });
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Ok("$argon2id$fresh".to_owned()));
        let service = make_service(users, hasher, MockTokenIssuer::new());

        let user = service.sign_up(registration()).await.expect("registered");

        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn sign_up_with_taken_identity_conflicts() {
        let mut users = MockUserRepository::new();
        users.expect_exists().returning(|_, _| Ok(true));
        users.expect_insert().times(0);
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().times(0);
        let service = make_service(users, hasher, MockTokenIssuer::new());

        let err = service
            .sign_up(registration())
            .await
            .expect_err("duplicate");

        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), DUPLICATE_USER);
    }

    #[tokio::test]
    async fn sign_up_race_on_unique_index_conflicts() {
        let mut users = MockUserRepository::new();
        users.expect_exists().returning(|_, _| Ok(false));
        users
            .expect_insert()
            .returning(|_| Err(UserPersistenceError::duplicate("users_username_key")));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().returning(|_| Ok("digest".to_owned()));
        let service = make_service(users, hasher, MockTokenIssuer::new());

        let err = service
            .sign_up(registration())
            .await
            .expect_err("duplicate");

        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn sign_in_issues_token_for_matching_password() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .withf(|plain, digest| plain == "hunter22" && digest == "$argon2id$stored")
            .returning(|_, _| Ok(true));
        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_issue()
            .withf(|claims| claims.user_id == UserId::new(1))
            .returning(|_| Ok(AccessToken::new("signed.jwt.token")));
        let service = make_service(stored_credentials(), hasher, tokens);

        let creds = LoginCredentials::try_from_parts("alice", "hunter22").expect("shape");
        let token = service.sign_in(&creds).await.expect("signed in");

        assert_eq!(token.as_str(), "signed.jwt.token");
    }

    #[tokio::test]
    async fn sign_in_rejects_wrong_password_and_unknown_user_alike() {
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().returning(|_, _| Ok(false));
        let mut tokens = MockTokenIssuer::new();
        tokens.expect_issue().times(0);
        let service = make_service(stored_credentials(), hasher, tokens);

        for (username, password) in [("alice", "wrong"), ("mallory", "hunter22")] {
            let creds = LoginCredentials::try_from_parts(username, password).expect("shape");
            let err = service.sign_in(&creds).await.expect_err("rejected");
            assert_eq!(err.code(), ErrorCode::Unauthorized);
            assert_eq!(err.message(), INVALID_CREDENTIALS);
        }
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let mut tokens = MockTokenIssuer::new();
        tokens.expect_verify().returning(|_| Err(TokenError::expired()));
        let service = make_service(
            MockUserRepository::new(),
            MockPasswordHasher::new(),
            tokens,
        );

        let err = service.authenticate("stale").expect_err("expired");

        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
