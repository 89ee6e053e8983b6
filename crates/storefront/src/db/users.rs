//! User repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pearl_treasure_core::{Email, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

/// Storage operations for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by ID.
    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Get a user by email address.
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Insert a new user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn create(&self, user: &User) -> Result<User, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    picture: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            name: row.name,
            picture: row.picture,
            created_at: row.created_at,
        })
    }
}

/// `PostgreSQL` implementation of [`UserRepository`].
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, name, picture, created_at
            FROM storefront.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, name, picture, created_at
            FROM storefront.user
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO storefront.user (id, email, name, picture, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, picture, created_at
            ",
        )
        .bind(&user.id)
        .bind(user.email.as_str())
        .bind(&user.name)
        .bind(user.picture.as_deref())
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        User::try_from(row)
    }
}
