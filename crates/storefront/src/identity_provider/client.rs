//! HTTP client for the identity provider.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::{IdentityProvider, ProviderError, ProviderSession};
use crate::config::IdentityProviderConfig;

const SESSION_DATA_PATH: &str = "auth/v1/env/oauth/session-data";
const SESSION_ID_HEADER: &str = "X-Session-ID";

/// Identity provider reached over HTTPS.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    inner: Arc<HttpIdentityProviderInner>,
}

struct HttpIdentityProviderInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpIdentityProvider {
    /// Create a new provider client.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Http` if the HTTP client cannot be built.
    pub fn new(config: &IdentityProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(HttpIdentityProviderInner {
                client,
                endpoint: session_data_endpoint(&config.base_url),
            }),
        })
    }

    /// The session-data URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }
}

/// Append the session-data path to `base`, keeping any path prefix.
fn session_data_endpoint(base: &Url) -> Url {
    let mut endpoint = base.clone();
    let path = format!("{}/{SESSION_DATA_PATH}", base.path().trim_end_matches('/'));
    endpoint.set_path(&path);
    endpoint.set_query(None);
    endpoint
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[tracing::instrument(skip_all)]
    async fn session_data(&self, session_id: &str) -> Result<ProviderSession, ProviderError> {
        let response = self
            .inner
            .client
            .get(self.inner.endpoint.clone())
            .header(SESSION_ID_HEADER, session_id)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Identity provider rejected session");
            return Err(ProviderError::Rejected(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(200).collect::<String>(),
                "Failed to parse identity provider response"
            );
            ProviderError::Parse(e)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use secrecy::ExposeSecret;

    use super::*;

    /// Serve a fake provider on an ephemeral port and return its base URL.
    async fn spawn_provider() -> Url {
        async fn session_data(headers: HeaderMap) -> (StatusCode, String) {
            match headers.get(SESSION_ID_HEADER).and_then(|v| v.to_str().ok()) {
                Some("good") => (
                    StatusCode::OK,
                    r#"{"email":"diver@pearls.example","name":"Diver","picture":"https://img.example/d.png","session_token":"tok-good"}"#.to_owned(),
                ),
                Some("garbled") => (StatusCode::OK, "not json".to_owned()),
                _ => (StatusCode::UNAUTHORIZED, r#"{"detail":"bad session"}"#.to_owned()),
            }
        }

        let app = Router::new().route("/prefix/auth/v1/env/oauth/session-data", get(session_data));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Url::parse(&format!("http://{addr}/prefix/")).unwrap()
    }

    fn provider(base_url: Url) -> HttpIdentityProvider {
        HttpIdentityProvider::new(&IdentityProviderConfig {
            base_url,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let base = Url::parse("https://id.example/tenant/").unwrap();
        assert_eq!(
            session_data_endpoint(&base).as_str(),
            "https://id.example/tenant/auth/v1/env/oauth/session-data"
        );

        let bare = Url::parse("https://id.example").unwrap();
        assert_eq!(
            session_data_endpoint(&bare).as_str(),
            "https://id.example/auth/v1/env/oauth/session-data"
        );
    }

    #[tokio::test]
    async fn test_accepted_session() {
        let provider = provider(spawn_provider().await);

        let session = provider.session_data("good").await.unwrap();

        assert_eq!(session.email.as_str(), "diver@pearls.example");
        assert_eq!(session.name, "Diver");
        assert_eq!(session.picture.as_deref(), Some("https://img.example/d.png"));
        assert_eq!(session.session_token.expose_secret(), "tok-good");
    }

    #[tokio::test]
    async fn test_rejected_session() {
        let provider = provider(spawn_provider().await);

        let err = provider.session_data("bad").await.unwrap_err();

        assert!(matches!(err, ProviderError::Rejected(401)));
    }

    #[tokio::test]
    async fn test_unparseable_payload() {
        let provider = provider(spawn_provider().await);

        let err = provider.session_data("garbled").await.unwrap_err();

        assert!(matches!(err, ProviderError::Parse(_)));
    }
}
