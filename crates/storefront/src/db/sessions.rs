//! Session repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pearl_treasure_core::{SessionId, SessionToken, UserId};

use super::RepositoryError;
use crate::models::Session;

/// Storage operations for sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a session.
    ///
    /// Tokens are unique: storing a token that is already bound replaces the
    /// old binding, so a token never resolves to more than one user.
    async fn create(&self, session: &Session) -> Result<(), RepositoryError>;

    /// Find the session carrying exactly this token, expired or not.
    async fn get_by_token(&self, token: &SessionToken)
    -> Result<Option<Session>, RepositoryError>;

    /// Delete one session. Returns whether it existed.
    async fn delete(&self, id: &SessionId) -> Result<bool, RepositoryError>;

    /// Delete every session of a user. Returns how many were removed.
    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: SessionId,
    user_id: UserId,
    token: SessionToken,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token: row.token,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// `PostgreSQL` implementation of [`SessionRepository`].
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.session (id, user_id, token, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (token) DO UPDATE
            SET id = EXCLUDED.id,
                user_id = EXCLUDED.user_id,
                expires_at = EXCLUDED.expires_at,
                created_at = EXCLUDED.created_at
            ",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.token)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_token(
        &self,
        token: &SessionToken,
    ) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT id, user_id, token, expires_at, created_at
            FROM storefront.session
            WHERE token = $1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Session::from))
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.session WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.session WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
