//! Client for the remote store API.
//!
//! # Architecture
//!
//! - JSON over HTTP with `reqwest` 0.13; the store API is the source of truth
//! - The session lives in a cookie held by the client's cookie store, so one
//!   `ApiClient` (and its clones) is one browser-like session
//! - Public branding is cached with `moka` (5 minute TTL)
//!
//! Endpoint methods are grouped by area in the submodules:
//!
//! | module | endpoints |
//! |---|---|
//! | `catalog` | `produtos`, `configuracao-publica` |
//! | `customers` | `clientes/*`, `admin/clientes` |
//! | `sales` | `vendas/*`, `admin/vendas` |
//! | `admin` | `admin/*` session and back-office |
//!
//! # Example
//!
//! ```rust,ignore
//! let api = ApiClient::new(&config)?;
//! let products = api.list_products().await?;
//! ```

mod admin;
mod catalog;
mod customers;
mod sales;
pub mod wire;

pub use customers::ProfileUpdate;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use folio_core::StoreBranding;

use crate::config::StorefrontConfig;
use wire::ErrorBody;

/// Shown when the store API could not be reached or answered garbage.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Please try again.";

const BRANDING_CACHE_KEY: &str = "branding";

/// Errors that can occur when talking to the store API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Connection(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {}", message.as_deref().unwrap_or("no message"))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },

    /// The response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

impl ApiError {
    /// Message suitable for a status banner.
    ///
    /// Server-reported messages are surfaced verbatim; anything else becomes
    /// the generic connection error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Server {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Server { message: None, .. }
            | Self::Connection(_)
            | Self::Decode(_)
            | Self::Endpoint(_) => CONNECTION_ERROR_MESSAGE.to_string(),
        }
    }

    /// HTTP status reported by the API, if it answered.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the API rejected the request for lack of a session.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the store API.
///
/// Cheap to clone; all clones share the cookie jar and the branding cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    /// Credentialed client: carries the session cookie.
    client: reqwest::Client,
    /// Cookie-less client for calls that must not carry a session.
    anonymous: reqwest::Client,
    base: Url,
    branding: Cache<&'static str, StoreBranding>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from the storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        Self::with_base_url(config.api_base_url.clone(), config.request_timeout)
    }

    /// Create a client for an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn with_base_url(base: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        let anonymous = reqwest::Client::builder().timeout(timeout).build()?;

        let branding = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                anonymous,
                base,
                branding,
            }),
        })
    }

    /// Base URL every endpoint path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.request(method, self.endpoint(path)?))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path)?).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path)?.json(body)).await
    }

    async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path)?.json(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::DELETE, path)?).await
    }

    /// POST without the session cookie.
    async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.inner.anonymous.post(self.endpoint(path)?).json(body);
        self.send(request).await
    }

    /// Send a request and decode a JSON response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Store API request failed");
            ApiError::Connection(e)
        })?;

        let status = response.status();
        let url = response.url().path().to_string();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&response_text)
                .ok()
                .and_then(ErrorBody::into_message);
            debug!(
                status = %status,
                path = %url,
                message = message.as_deref().unwrap_or(""),
                "Store API returned non-success status"
            );
            return Err(ApiError::Server { status, message });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %url,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse store API response"
            );
            ApiError::Decode(e)
        })
    }

    // =========================================================================
    // Session Plumbing
    // =========================================================================

    /// GET a session status endpoint.
    pub(crate) async fn session_status<P: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<wire::SessionStatus<P>, ApiError> {
        self.get(path).await
    }

    /// POST credentials to a session endpoint.
    pub(crate) async fn session_login<P: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<wire::IdentityEnvelope<P>, ApiError> {
        self.post(path, body).await
    }

    /// POST to a session logout endpoint.
    pub(crate) async fn session_logout(&self, path: &str) -> Result<wire::MessageBody, ApiError> {
        self.post(path, &serde_json::json!({})).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::Server {
            status: StatusCode::UNAUTHORIZED,
            message: Some("bad credentials".to_string()),
        };
        assert_eq!(err.user_message(), "bad credentials");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_user_message_without_server_text() {
        let err = ApiError::Server {
            status: StatusCode::BAD_GATEWAY,
            message: None,
        };
        assert_eq!(err.user_message(), CONNECTION_ERROR_MESSAGE);
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));

        let decode = serde_json::from_str::<u8>("x").unwrap_err();
        assert_eq!(
            ApiError::Decode(decode).user_message(),
            CONNECTION_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_endpoints_join_under_base() {
        let api = ApiClient::with_base_url(
            Url::parse("http://127.0.0.1:5000/api/").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            api.endpoint("vendas/7/reenviar-email").unwrap().as_str(),
            "http://127.0.0.1:5000/api/vendas/7/reenviar-email"
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_is_a_connection_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let api = ApiClient::with_base_url(
            Url::parse("http://127.0.0.1:9/api/").unwrap(),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = api.list_products().await.unwrap_err();
        assert!(matches!(err, ApiError::Connection(_)));
        assert_eq!(err.user_message(), CONNECTION_ERROR_MESSAGE);
    }
}
