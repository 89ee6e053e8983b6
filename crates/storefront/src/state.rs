//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::Repositories;
use crate::identity_provider::IdentityProvider;
use crate::services::{CartEngine, CatalogService, IdentityResolver, SessionIssuer};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the repositories and configuration. Services are
/// built from it per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    repos: Repositories,
    provider: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `repos` - Storage backend
    /// * `provider` - External identity provider used at login
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        repos: Repositories,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                repos,
                provider,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the repositories.
    #[must_use]
    pub fn repos(&self) -> &Repositories {
        &self.inner.repos
    }

    /// Credential-to-user resolution.
    #[must_use]
    pub fn identity_resolver(&self) -> IdentityResolver<'_> {
        let repos = self.repos();
        IdentityResolver::new(repos.sessions.as_ref(), repos.users.as_ref())
    }

    /// Login and logout.
    #[must_use]
    pub fn session_issuer(&self) -> SessionIssuer<'_> {
        let repos = self.repos();
        SessionIssuer::new(
            repos.users.as_ref(),
            repos.sessions.as_ref(),
            self.inner.provider.as_ref(),
            self.config().session.ttl,
        )
    }

    /// The pearl catalog.
    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(self.repos().pearls.as_ref())
    }

    /// The cart engine.
    #[must_use]
    pub fn cart(&self) -> CartEngine<'_> {
        let repos = self.repos();
        CartEngine::new(repos.carts.as_ref(), repos.pearls.as_ref())
    }
}
