//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::identity_provider::ProviderError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider did not accept the session ID.
    #[error("invalid session ID")]
    InvalidSession,

    /// No valid session credential was presented.
    #[error("not authenticated")]
    Unauthenticated,

    /// Talking to the provider failed.
    #[error("identity provider error: {0}")]
    Provider(ProviderError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<ProviderError> for AuthError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Rejected(_) => Self::InvalidSession,
            other => Self::Provider(other),
        }
    }
}
