//! Login, logout and current-user routes.

use axum::{
    Json,
    extract::{Query, State},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::error::{Result, clear_sentry_user};
use crate::middleware::{OptionalUser, removal_cookie, session_cookie};
use crate::models::{PublicUser, User};
use crate::services::auth::require_user;
use crate::state::AppState;

/// Query for `POST /api/auth/process-session`.
#[derive(Debug, Deserialize)]
pub struct ProcessSessionQuery {
    #[serde(default)]
    pub session_id: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: PublicUser,
}

/// Logout response.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Exchange a provider session ID for a local session and set the cookie.
#[tracing::instrument(skip_all)]
pub async fn process_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ProcessSessionQuery>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let issued = state
        .session_issuer()
        .process_session(&query.session_id)
        .await?;

    let jar = jar.add(session_cookie(&issued.session.token, &state.config().session));

    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            user: issued.user.into(),
        }),
    ))
}

/// Log the caller out everywhere. Always succeeds.
pub async fn logout(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    state.session_issuer().logout(user.as_ref()).await;
    clear_sentry_user();

    (
        jar.remove(removal_cookie()),
        Json(LogoutResponse { success: true }),
    )
}

/// The authenticated user.
pub async fn me(OptionalUser(user): OptionalUser) -> Result<Json<User>> {
    Ok(Json(require_user(user)?))
}
