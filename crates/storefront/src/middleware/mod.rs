//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction) - added in `main`
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (reuse or generate, echo in response)
//! 4. CORS (mirror origin, allow credentials)
//!
//! Authentication is per handler through the `RequireUser` and
//! `OptionalUser` extractors.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalUser, RequireUser};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, removal_cookie, session_cookie};
