//! External identity provider.
//!
//! Login happens at the provider; the browser comes back with a one-time
//! session ID which the storefront exchanges here for the user's profile and
//! a durable session token.
//!
//! # Protocol
//!
//! `GET {base}/auth/v1/env/oauth/session-data` with header
//! `X-Session-ID: <id>`. A 200 response carries
//! `{"email", "name", "picture"?, "session_token"}`; any other status means
//! the session ID was rejected.

mod client;

pub use client::HttpIdentityProvider;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use pearl_treasure_core::{Email, SessionToken};

/// Errors that can occur when talking to the identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("identity provider rejected the session (HTTP {0})")]
    Rejected(u16),

    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The success payload could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Profile and token returned by a successful session exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSession {
    pub email: Email,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    pub session_token: SessionToken,
}

/// Exchanges one-time provider session IDs for profile data.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up the session behind `session_id`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Rejected` if the provider does not accept the
    /// ID, and `Http`/`Parse` for transport or payload failures.
    async fn session_data(&self, session_id: &str) -> Result<ProviderSession, ProviderError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_payload_without_picture() {
        let session: ProviderSession = serde_json::from_str(
            r#"{"email":"diver@pearls.example","name":"Diver","session_token":"tok-1"}"#,
        )
        .unwrap();

        assert_eq!(session.email.as_str(), "diver@pearls.example");
        assert!(session.picture.is_none());
        assert_eq!(session.session_token.expose_secret(), "tok-1");
    }

    #[test]
    fn test_payload_with_invalid_email_is_rejected() {
        let result: Result<ProviderSession, _> = serde_json::from_str(
            r#"{"email":"nope","name":"Diver","session_token":"tok-1"}"#,
        );
        assert!(result.is_err());
    }
}
