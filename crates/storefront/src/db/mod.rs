//! Storage for storefront data.
//!
//! Every entity is reached through a repository trait so the services never
//! touch a storage handle directly. Two backends implement the traits:
//!
//! - `PostgreSQL` (schema `storefront`), used when a database URL is configured
//! - [`MemoryStore`], used in tests and when running without a database
//!
//! ## Tables
//!
//! - `user` - Accounts, keyed by the provider-reported email
//! - `session` - Bearer tokens bound to users, with expiry
//! - `pearl` - The catalog
//! - `cart` - One cart per user, created on first mutation
//! - `cart_line` - Cart contents, at most one line per pearl per cart
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p pearl-treasure-cli -- migrate
//! ```

pub mod carts;
pub mod memory;
pub mod pearls;
pub mod sessions;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::{CartRepository, PgCartRepository};
pub use memory::MemoryStore;
pub use pearls::{PearlRepository, PgPearlRepository};
pub use sessions::{PgSessionRepository, SessionRepository};
pub use users::{PgUserRepository, UserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// The full set of repositories behind one storage backend.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub pearls: Arc<dyn PearlRepository>,
    pub carts: Arc<dyn CartRepository>,
    pool: Option<PgPool>,
}

impl Repositories {
    /// Repositories backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool.clone())),
            pearls: Arc::new(PgPearlRepository::new(pool.clone())),
            carts: Arc::new(PgCartRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Repositories backed by a shared in-memory store.
    #[must_use]
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            sessions: store.clone(),
            pearls: store.clone(),
            carts: store,
            pool: None,
        }
    }

    /// Check the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories")
            .field("postgres", &self.pool.is_some())
            .finish_non_exhaustive()
    }
}
