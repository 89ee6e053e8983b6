//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pearl_treasure_core::{Email, UserId};

/// A storefront user.
///
/// Created the first time the identity provider reports an unseen email and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address reported by the provider (natural key).
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Avatar URL, if the provider supplied one.
    pub picture: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    pub picture: Option<String>,
}

impl NewUser {
    /// Materialize the record with a fresh id and creation time.
    #[must_use]
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: UserId::generate(),
            email: self.email,
            name: self.name,
            picture: self.picture,
            created_at: now,
        }
    }
}

/// The user fields returned to clients after login.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub picture: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            picture: user.picture,
        }
    }
}
