//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Error bodies are JSON of the form `{"detail": "..."}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CartError, CatalogError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::Auth(AuthError::Provider(_) | AuthError::Repository(_))
                | Self::Cart(CartError::Repository(_))
                | Self::Catalog(CatalogError::Repository(_))
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::InvalidSession)
            | Self::Cart(CartError::InvalidQuantity(_))
            | Self::Catalog(CatalogError::Invalid(_))
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::Unauthenticated) | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Cart(CartError::PearlNotFound(_) | CartError::CartNotFound)
            | Self::Catalog(CatalogError::NotFound(_))
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Don't expose internal error details to clients
    fn detail(&self) -> String {
        match self {
            Self::Auth(AuthError::InvalidSession) => "Invalid session ID".to_string(),
            Self::Auth(AuthError::Unauthenticated) => "Not authenticated".to_string(),
            Self::Auth(_) => "Session processing failed".to_string(),
            Self::Cart(CartError::PearlNotFound(_)) | Self::Catalog(CatalogError::NotFound(_)) => {
                "Pearl not found".to_string()
            }
            Self::Cart(CartError::CartNotFound) => "Cart not found".to_string(),
            Self::Cart(CartError::InvalidQuantity(e)) => e.to_string(),
            Self::Catalog(CatalogError::Invalid(msg))
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Set the Sentry user context for the current request.
///
/// Called after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Called on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pearl_treasure_core::PearlId;

    use super::*;
    use crate::identity_provider::ProviderError;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("pearl-123".to_string());
        assert_eq!(err.to_string(), "Not found: pearl-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(AuthError::InvalidSession.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AuthError::Provider(ProviderError::Rejected(502)).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AuthError::Unauthenticated.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(CartError::PearlNotFound(PearlId::new("X")).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CartError::CartNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CatalogError::Invalid("name cannot be empty".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_is_json_detail() {
        let response = AppError::Cart(CartError::CartNotFound).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "detail": "Cart not found" }));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let response = AppError::Database(RepositoryError::DataCorruption(
            "bad email in row 7".to_string(),
        ))
        .into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("row 7"));
    }
}
