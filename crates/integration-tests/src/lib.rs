//! Integration tests for Pearl Treasure.
//!
//! # Running Tests
//!
//! ```bash
//! # Database tests: apply migrations to a scratch database first
//! STOREFRONT_DATABASE_URL=postgres://... cargo run -p pearl-treasure-cli -- migrate
//! STOREFRONT_DATABASE_URL=postgres://... cargo test -p pearl-treasure-integration-tests -- --ignored
//!
//! # API tests additionally need a running storefront
//! STOREFRONT_BASE_URL=http://localhost:8001 cargo test -p pearl-treasure-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_api` - Black-box HTTP tests against a running server
//! - `storefront_db` - `PostgreSQL` repository behaviour

use secrecy::SecretString;
use sqlx::PgPool;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:8001".to_string())
}

/// Connect to the test database named by `STOREFRONT_DATABASE_URL`.
///
/// # Panics
///
/// Panics if the variable is unset or the database is unreachable.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL must be set for database tests");
    pearl_treasure_storefront::db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database")
}

/// A suffix that keeps rows from concurrent test runs apart.
#[must_use]
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
