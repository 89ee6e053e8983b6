//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness
//! GET    /health/ready                 - Readiness (storage ping)
//!
//! # Auth
//! POST   /api/auth/process-session?session_id=  - Exchange provider session, set cookie
//! POST   /api/auth/logout              - Delete all of the caller's sessions
//! GET    /api/auth/me                  - Current user (401 if anonymous)
//!
//! # Catalog
//! GET    /api/pearls?category=&search= - List in-stock pearls
//! GET    /api/pearls/{id}              - One pearl
//! POST   /api/pearls                   - Create (auth)
//! PATCH  /api/pearls/{id}              - Partial update (auth)
//! DELETE /api/pearls/{id}              - Delete (auth)
//!
//! # Cart (auth)
//! GET    /api/cart                     - Priced cart view
//! POST   /api/cart/add                 - Add or merge a line
//! PUT    /api/cart/{id}?quantity=      - Set quantity (<= 0 removes)
//! DELETE /api/cart/{id}                - Remove a line
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod pearls;


use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Acknowledgement returned by mutations.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: &'static str,
}

impl Ack {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/process-session", post(auth::process_session))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the catalog routes router.
pub fn pearl_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pearls::index).post(pearls::create))
        .route(
            "/{id}",
            get(pearls::show)
                .patch(pearls::update)
                .delete(pearls::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/{id}", put(cart::update).delete(cart::remove))
}

/// Create all API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/pearls", pearl_routes())
        .nest("/cart", cart_routes())
}

/// Browser clients call from another origin with the session cookie, so
/// the origin is mirrored rather than wildcarded.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Build the complete application router with its middleware stack.
///
/// Sentry layers are added on top of this in `main`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
        .layer(cors_layer())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<Body>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}
