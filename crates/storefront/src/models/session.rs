//! Session records.

use chrono::{DateTime, Utc};

use pearl_treasure_core::{SessionId, SessionToken, UserId};

/// A time-bounded binding from a token to a user.
///
/// A user may hold many sessions (one per device/login). The token is unique
/// across all sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub token: SessionToken,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a session for `user_id` that lives for `ttl` from `now`.
    #[must_use]
    pub fn issue(
        user_id: UserId,
        token: SessionToken,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            user_id,
            token,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// A session is expired once its expiry is at or before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
