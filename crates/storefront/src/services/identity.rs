//! Identity resolution: credential to user.
//!
//! Resolution never fails. A missing, unknown or expired token, an orphaned
//! session, or a storage error all resolve to "anonymous"; callers that need
//! a user turn that into a 401 themselves. An expired session found during
//! resolution is deleted on the spot.

use chrono::{DateTime, Utc};

use pearl_treasure_core::SessionToken;

use crate::db::{RepositoryError, SessionRepository, UserRepository};
use crate::models::User;

/// Pick the credential for a request.
///
/// The session cookie wins over an `Authorization: Bearer` token; an empty
/// cookie counts as absent.
#[must_use]
pub fn credential_from(cookie: Option<&str>, bearer: Option<&str>) -> Option<SessionToken> {
    [cookie, bearer]
        .into_iter()
        .flatten()
        .find(|t| !t.is_empty())
        .map(SessionToken::new)
}

/// Maps session tokens to users.
pub struct IdentityResolver<'a> {
    sessions: &'a dyn SessionRepository,
    users: &'a dyn UserRepository,
}

impl<'a> IdentityResolver<'a> {
    /// Create a resolver over the given repositories.
    #[must_use]
    pub const fn new(sessions: &'a dyn SessionRepository, users: &'a dyn UserRepository) -> Self {
        Self { sessions, users }
    }

    /// Resolve `token` to the acting user, or `None` for anonymous.
    pub async fn resolve(&self, token: Option<&SessionToken>) -> Option<User> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Resolve `token` as of `now`.
    pub async fn resolve_at(&self, token: Option<&SessionToken>, now: DateTime<Utc>) -> Option<User> {
        let token = token.filter(|t| !t.is_empty())?;
        match self.lookup(token, now).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(error = %e, "Session lookup failed; treating request as anonymous");
                None
            }
        }
    }

    async fn lookup(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError> {
        let Some(session) = self.sessions.get_by_token(token).await? else {
            return Ok(None);
        };

        if session.is_expired_at(now) {
            self.sessions.delete(&session.id).await?;
            tracing::debug!(session_id = %session.id, "Deleted expired session");
            return Ok(None);
        }

        let user = self.users.get_by_id(&session.user_id).await?;
        if user.is_none() {
            tracing::warn!(
                session_id = %session.id,
                user_id = %session.user_id,
                "Session refers to a missing user"
            );
        }
        Ok(user)
    }
}
