//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults suit local development.
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; when neither is set the in-memory store is used)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 8001)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: `http://localhost:8001`)
//! - `IDENTITY_PROVIDER_URL` - Base URL of the session-exchange provider
//! - `IDENTITY_PROVIDER_TIMEOUT_SECS` - Provider request timeout (default: 10)
//! - `SESSION_TTL_DAYS` - Session lifetime in days (default: 7)
//! - `SESSION_COOKIE_SECURE` - Set the `Secure` cookie attribute (default: true)
//! - `SEED_SAMPLE_CATALOG` - Seed sample pearls into an empty catalog (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default identity provider used when `IDENTITY_PROVIDER_URL` is unset.
pub const DEFAULT_IDENTITY_PROVIDER_URL: &str = "https://demobackend.emergentagent.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Identity provider settings
    pub identity: IdentityProviderConfig,
    /// Session cookie and lifetime settings
    pub session: SessionConfig,
    /// Seed the sample catalog on startup when it is empty
    pub seed_sample_catalog: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// External identity provider configuration.
#[derive(Debug, Clone)]
pub struct IdentityProviderConfig {
    /// Provider base URL; the session-data path is appended to it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Session lifetime and cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long an issued session stays valid
    pub ttl: chrono::Duration,
    /// Whether the session cookie carries the `Secure` attribute
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::days(7),
            cookie_secure: true,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL");
        let host = parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("STOREFRONT_PORT", "8001")?;
        let base_url = parse_env_or_default("STOREFRONT_BASE_URL", "http://localhost:8001")?;

        let identity = IdentityProviderConfig {
            base_url: parse_env_or_default("IDENTITY_PROVIDER_URL", DEFAULT_IDENTITY_PROVIDER_URL)?,
            timeout: Duration::from_secs(parse_env_or_default(
                "IDENTITY_PROVIDER_TIMEOUT_SECS",
                "10",
            )?),
        };

        let ttl_days: u16 = parse_env_or_default("SESSION_TTL_DAYS", "7")?;
        if ttl_days == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SESSION_TTL_DAYS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let session = SessionConfig {
            ttl: chrono::Duration::days(i64::from(ttl_days)),
            cookie_secure: parse_env_or_default("SESSION_COOKIE_SECURE", "true")?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            identity,
            session,
            seed_sample_catalog: parse_env_or_default("SEED_SAMPLE_CATALOG", "true")?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_sample_rate("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_sample_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_value(key, &raw)
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a Sentry sample rate and check it lies in `0.0..=1.0`.
fn parse_sample_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env_or_default(key, default)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: None,
            host: "127.0.0.1".parse().unwrap(),
            port: 8001,
            base_url: Url::parse("http://localhost:8001").unwrap(),
            identity: IdentityProviderConfig {
                base_url: Url::parse(DEFAULT_IDENTITY_PROVIDER_URL).unwrap(),
                timeout: Duration::from_secs(10),
            },
            session: SessionConfig::default(),
            seed_sample_catalog: true,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8001);
    }

    #[test]
    fn test_parse_value_reports_variable_name() {
        let err = parse_value::<u16>("STOREFRONT_PORT", "eighty").unwrap_err();
        let ConfigError::InvalidEnvVar(key, _) = err;
        assert_eq!(key, "STOREFRONT_PORT");
    }

    #[test]
    fn test_parse_value_trims() {
        let secure: bool = parse_value("SESSION_COOKIE_SECURE", " false ").unwrap();
        assert!(!secure);
        let url: Url = parse_value("IDENTITY_PROVIDER_URL", "https://id.example").unwrap();
        assert_eq!(url.host_str(), Some("id.example"));
    }

    #[test]
    fn test_parse_value_rejects_bad_url() {
        assert!(parse_value::<Url>("STOREFRONT_BASE_URL", "not a url").is_err());
    }

    #[test]
    fn test_default_session_lifetime_is_seven_days() {
        assert_eq!(SessionConfig::default().ttl, chrono::Duration::days(7));
        assert!(SessionConfig::default().cookie_secure);
    }

    #[test]
    fn test_database_url_is_redacted_in_debug() {
        let mut config = test_config();
        config.database_url = Some(SecretString::from("postgres://user:hunter2@db/pearls"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
    }
}
