//! User data model.
//!
//! Field-level validation (lengths, e-mail and URL syntax) happens at the
//! inbound boundary. Types here only carry already validated values.

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::UserId;

/// Avatar assigned when a user signs up without one.
pub const DEFAULT_AVATAR: &str = "https://i.pravatar.cc/300";
/// About text assigned when a user signs up without one.
pub const DEFAULT_ABOUT: &str = "Has not shared anything about themselves yet";

/// Registered user as seen by the rest of the system.
///
/// The password digest is deliberately absent; see [`UserCredentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub about: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored digest for a user, used only by sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub user_id: UserId,
    pub username: String,
    pub password_hash: String,
}

/// Row inserted by the identity store at signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub about: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

/// Partial update applied by the identity store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub about: Option<String>,
    pub avatar: Option<String>,
}

impl UserPatch {
    /// Apply the present fields to `user`.
    pub fn apply(&self, user: &mut User) {
        if let Some(username) = &self.username {
            user.username.clone_from(username);
        }
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        if let Some(about) = &self.about {
            user.about.clone_from(about);
        }
        if let Some(avatar) = &self.avatar {
            user.avatar.clone_from(avatar);
        }
    }
}

/// Validated signup payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: Zeroizing<String>,
    pub about: Option<String>,
    pub avatar: Option<String>,
}

/// Validated profile update payload; the password is still plaintext.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub about: Option<String>,
    pub avatar: Option<String>,
}
