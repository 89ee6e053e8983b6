//! Pearl Treasure storefront - JSON API for the pearl shop.
//!
//! Serves the catalog, session login and cart endpoints on port 8001.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - External identity provider exchanges one-time session IDs for users
//! - `PostgreSQL` for users, sessions, pearls and carts
//! - In-memory store when no database is configured (development only)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use pearl_treasure_storefront::config::StorefrontConfig;
use pearl_treasure_storefront::db::{self, MemoryStore, Repositories};
use pearl_treasure_storefront::identity_provider::HttpIdentityProvider;
use pearl_treasure_storefront::routes;
use pearl_treasure_storefront::state::AppState;
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Connect to `PostgreSQL`, or fall back to the in-memory store.
async fn open_repositories(database_url: Option<&SecretString>) -> Repositories {
    let Some(url) = database_url else {
        tracing::warn!("No database configured; using the in-memory store, data is lost on exit");
        return Repositories::in_memory(Arc::new(MemoryStore::new()));
    };

    let pool = db::create_pool(url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");
    Repositories::postgres(pool)
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pearl_treasure_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p pearl-treasure-cli -- migrate
    let repos = open_repositories(config.database_url.as_ref()).await;

    let provider = HttpIdentityProvider::new(&config.identity)
        .expect("Failed to build identity provider client");
    tracing::info!(endpoint = %provider.endpoint(), "Identity provider configured");

    let state = AppState::new(config.clone(), repos, Arc::new(provider));

    if config.seed_sample_catalog {
        match state.catalog().seed_sample_catalog().await {
            Ok(0) => tracing::debug!("Catalog already populated, skipping seed"),
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Failed to seed sample catalog"),
        }
    }

    let app = routes::router(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
