use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, User, UserCredentials, UserId, UserPatch};

use super::{MemoryStore, StoredUser, Tables};

fn lock_error(message: &'static str) -> UserPersistenceError {
    UserPersistenceError::connection(message)
}

/// First unique key `username`/`email` would collide on, ignoring `except`.
fn collision(tables: &Tables, username: &str, email: &str, except: Option<i64>) -> Option<&'static str> {
    tables
        .users
        .iter()
        .filter(|(id, _)| Some(**id) != except)
        .find_map(|(_, stored)| {
            if stored.user.username == username {
                Some("users_username_key")
            } else if stored.user.email == email {
                Some("users_email_key")
            } else {
                None
            }
        })
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock(lock_error)?;
        Ok(tables.users.get(&id.get()).map(|stored| stored.user.clone()))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let tables = self.lock(lock_error)?;
        Ok(tables
            .users
            .values()
            .filter(|stored| ids.contains(&stored.user.id))
            .map(|stored| stored.user.clone())
            .collect())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock(lock_error)?;
        Ok(tables
            .users
            .values()
            .find(|stored| stored.user.username == username)
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_username_or_email(
        &self,
        query: &str,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let tables = self.lock(lock_error)?;
        Ok(tables
            .users
            .values()
            .filter(|stored| stored.user.username == query || stored.user.email == query)
            .map(|stored| stored.user.clone())
            .collect())
    }

    async fn exists(&self, username: &str, email: &str) -> Result<bool, UserPersistenceError> {
        let tables = self.lock(lock_error)?;
        Ok(collision(&tables, username, email, None).is_some())
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let tables = self.lock(lock_error)?;
        Ok(tables
            .users
            .values()
            .find(|stored| stored.user.username == username)
            .map(|stored| UserCredentials {
                user_id: stored.user.id,
                username: stored.user.username.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn insert(&self, user: NewUser) -> Result<User, UserPersistenceError> {
        let mut tables = self.lock(lock_error)?;
        if let Some(key) = collision(&tables, &user.username, &user.email, None) {
            return Err(UserPersistenceError::duplicate(key));
        }
        let id = tables.user_ids.next();
        let stored = StoredUser {
            user: User {
                id: UserId::new(id),
                username: user.username,
                email: user.email,
                about: user.about,
                avatar: user.avatar,
                created_at: user.created_at,
                updated_at: user.created_at,
            },
            password_hash: user.password_hash,
        };
        let created = stored.user.clone();
        tables.users.insert(id, stored);
        Ok(created)
    }

    async fn update(
        &self,
        id: UserId,
        patch: UserPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut tables = self.lock(lock_error)?;
        let Some(current) = tables.users.get(&id.get()) else {
            return Ok(None);
        };
        let mut next = current.user.clone();
        patch.apply(&mut next);
        if let Some(key) = collision(&tables, &next.username, &next.email, Some(id.get())) {
            return Err(UserPersistenceError::duplicate(key));
        }
        next.updated_at = now;

        let Some(stored) = tables.users.get_mut(&id.get()) else {
            return Ok(None);
        };
        stored.user = next.clone();
        if let Some(hash) = patch.password_hash {
            stored.password_hash = hash;
        }
        Ok(Some(next))
    }
}
