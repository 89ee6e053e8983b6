//! Business logic services for the storefront.
//!
//! Services borrow the repositories they need from [`crate::db::Repositories`]
//! and are built per request.
//!
//! # Services
//!
//! - `identity` - Resolve a session credential to a user
//! - `auth` - Exchange provider sessions for local sessions, logout
//! - `catalog` - Pearl listing, lookup, management and sample seeding
//! - `cart` - Per-user cart reads and mutations

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod identity;

pub use auth::{AuthError, IssuedSession, SessionIssuer};
pub use cart::{CartEngine, CartError};
pub use catalog::{CatalogError, CatalogService};
pub use identity::IdentityResolver;

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for service and route tests.

    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;

    use pearl_treasure_core::{Email, PearlCategory, PearlId, Price, SessionToken};

    use crate::db::{MemoryStore, PearlRepository};
    use crate::identity_provider::{IdentityProvider, ProviderError, ProviderSession};
    use crate::models::Pearl;

    /// Identity provider that knows a fixed set of session IDs.
    #[derive(Default)]
    pub struct FakeProvider {
        sessions: HashMap<String, ProviderSession>,
    }

    impl FakeProvider {
        /// Accept `session_id`, reporting `email` and issuing `token`.
        #[must_use]
        pub fn with_session(mut self, session_id: &str, email: &str, token: &str) -> Self {
            self.sessions.insert(
                session_id.to_owned(),
                ProviderSession {
                    email: Email::parse(email).expect("valid test email"),
                    name: "Pearl Diver".to_owned(),
                    picture: Some("https://img.example/diver.png".to_owned()),
                    session_token: SessionToken::new(token),
                },
            );
            self
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn session_data(&self, session_id: &str) -> Result<ProviderSession, ProviderError> {
            self.sessions
                .get(session_id)
                .cloned()
                .ok_or(ProviderError::Rejected(401))
        }
    }

    /// A catalog entry with the given ID and whole-unit price.
    #[must_use]
    pub fn pearl(id: &str, price: u32) -> Pearl {
        Pearl {
            id: PearlId::new(id),
            name: format!("Pearl {id}"),
            price: Price::from_units(price),
            category: PearlCategory::Akoya,
            image: "data:image/svg+xml;base64,".to_owned(),
            description: "A test pearl".to_owned(),
            size: "7mm".to_owned(),
            origin: "Japan".to_owned(),
            in_stock: true,
            created_at: Utc::now(),
        }
    }

    /// A store pre-loaded with the given pearls.
    pub async fn store_with(pearls: &[Pearl]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for p in pearls {
            PearlRepository::create(store.as_ref(), p)
                .await
                .expect("insert test pearl");
        }
        store
    }
}
