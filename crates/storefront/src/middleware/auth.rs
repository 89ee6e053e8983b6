//! Authentication extractors.
//!
//! Resolve the acting user from the `session_token` cookie or an
//! `Authorization: Bearer` header. The cookie wins when both are present.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::TypedHeader;
use axum_extra::extract::CookieJar;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use pearl_treasure_core::SessionToken;

use super::session::SESSION_COOKIE_NAME;
use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::identity::credential_from;
use crate::state::AppState;

/// The credential presented with a request, if any.
async fn request_credential(parts: &mut Parts) -> Option<SessionToken> {
    let jar = CookieJar::from_headers(&parts.headers);
    let bearer = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, &())
        .await
        .ok();

    credential_from(
        jar.get(SESSION_COOKIE_NAME).map(|c| c.value()),
        bearer.as_ref().map(|TypedHeader(auth)| auth.token()),
    )
}

async fn resolve(parts: &mut Parts, state: &AppState) -> Option<User> {
    let token = request_credential(parts).await;
    let user = state.identity_resolver().resolve(token.as_ref()).await;
    if let Some(user) = &user {
        set_sentry_user(&user.id, Some(user.email.as_str()));
    }
    user
}

/// Extractor that requires an authenticated user.
///
/// Anonymous requests are rejected with 401 and a JSON `detail`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireUser`, this does not reject anonymous requests.
pub struct OptionalUser(pub Option<User>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts, state).await))
    }
}
