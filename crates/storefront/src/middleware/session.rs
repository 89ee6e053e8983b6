//! Session cookie handling.
//!
//! The cookie carries the provider-issued session token. It is `HttpOnly`,
//! scoped to the whole site and sent cross-site (`SameSite=None`), which
//! browsers only accept together with `Secure`.

use axum_extra::extract::cookie::{Cookie, SameSite};
use secrecy::ExposeSecret;
use time::Duration;

use pearl_treasure_core::SessionToken;

use crate::config::SessionConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "session_token";

/// Build the cookie that carries `token` for the configured session lifetime.
#[must_use]
pub fn session_cookie(token: &SessionToken, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.expose_secret().to_owned()))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::None)
        .max_age(Duration::seconds(config.ttl.num_seconds()))
        .build()
}

/// Build a cookie that, when added to a jar, clears the session cookie.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(&SessionToken::new("tok-1"), &SessionConfig::default());

        assert_eq!(cookie.name(), "session_token");
        assert_eq!(cookie.value(), "tok-1");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
    }

    #[test]
    fn test_insecure_cookie_for_local_development() {
        let config = SessionConfig {
            cookie_secure: false,
            ..SessionConfig::default()
        };
        let cookie = session_cookie(&SessionToken::new("tok-1"), &config);
        assert_eq!(cookie.secure(), Some(false));
    }
}
