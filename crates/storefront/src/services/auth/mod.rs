//! Session issuing.
//!
//! Exchanges a one-time provider session ID for a local user and session,
//! and tears sessions down again on logout.

mod error;

pub use error::AuthError;

use chrono::{DateTime, Utc};

use crate::db::{RepositoryError, SessionRepository, UserRepository};
use crate::identity_provider::IdentityProvider;
use crate::models::{NewUser, Session, User};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: User,
    pub session: Session,
}

/// Issues and revokes sessions.
pub struct SessionIssuer<'a> {
    users: &'a dyn UserRepository,
    sessions: &'a dyn SessionRepository,
    provider: &'a dyn IdentityProvider,
    ttl: chrono::Duration,
}

impl<'a> SessionIssuer<'a> {
    /// Create a new session issuer.
    #[must_use]
    pub const fn new(
        users: &'a dyn UserRepository,
        sessions: &'a dyn SessionRepository,
        provider: &'a dyn IdentityProvider,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            provider,
            ttl,
        }
    }

    /// Exchange `session_id` with the provider and open a local session.
    ///
    /// The user is looked up by the provider-reported email and created on
    /// first sight. The session stores the provider-issued token and expires
    /// after the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSession` if the ID is blank or the provider
    /// rejects it, `AuthError::Provider` for transport or payload failures,
    /// and `AuthError::Repository` if storage fails.
    #[tracing::instrument(skip_all)]
    pub async fn process_session(&self, session_id: &str) -> Result<IssuedSession, AuthError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(AuthError::InvalidSession);
        }

        let data = self.provider.session_data(session_id).await?;
        if data.session_token.is_empty() {
            return Err(AuthError::InvalidSession);
        }

        let now = Utc::now();
        let user = self
            .find_or_create_user(
                NewUser {
                    email: data.email,
                    name: data.name,
                    picture: data.picture,
                },
                now,
            )
            .await?;

        let session = Session::issue(user.id.clone(), data.session_token, now, self.ttl);
        self.sessions.create(&session).await?;

        tracing::info!(user_id = %user.id, expires_at = %session.expires_at, "Session issued");
        Ok(IssuedSession { user, session })
    }

    async fn find_or_create_user(
        &self,
        new_user: NewUser,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        if let Some(user) = self.users.get_by_email(&new_user.email).await? {
            return Ok(user);
        }

        let email = new_user.email.clone();
        match self.users.create(&new_user.into_user(now)).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Created user on first login");
                Ok(user)
            }
            // Lost a race with a concurrent first login for the same email.
            Err(RepositoryError::Conflict(_)) => self
                .users
                .get_by_email(&email)
                .await?
                .ok_or(AuthError::Repository(RepositoryError::NotFound)),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every session of `user`, logging out all devices.
    ///
    /// Anonymous callers and storage failures are not errors; logout always
    /// succeeds from the caller's point of view. Returns the number of
    /// sessions removed.
    pub async fn logout(&self, user: Option<&User>) -> u64 {
        let Some(user) = user else {
            return 0;
        };

        match self.sessions.delete_for_user(&user.id).await {
            Ok(removed) => {
                tracing::info!(user_id = %user.id, removed, "Logged out");
                removed
            }
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Failed to delete sessions on logout");
                0
            }
        }
    }
}

/// The acting user, or `AuthError::Unauthenticated` for anonymous callers.
///
/// # Errors
///
/// Returns `AuthError::Unauthenticated` if `user` is `None`.
pub fn require_user(user: Option<User>) -> Result<User, AuthError> {
    user.ok_or(AuthError::Unauthenticated)
}
