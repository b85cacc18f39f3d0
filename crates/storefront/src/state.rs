//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, ApiError};
use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::notices::Notices;
use crate::session::{AdminSession, CustomerSession};
use crate::storage::{ClientStorage, FileStorage};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and is the one place views
/// reach the cart, both session contexts, and the store API.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    cart: Mutex<CartStore>,
    customer: CustomerSession,
    admin: AdminSession,
    notices: Notices,
}

impl AppState {
    /// Create application state backed by file storage in the configured
    /// data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let storage = Arc::new(FileStorage::new(config.data_dir.clone()));
        Self::with_storage(config, storage)
    }

    /// Create application state over an explicit storage backend.
    ///
    /// Both session contexts start out loading; call
    /// [`start_session_probes`](Self::start_session_probes) to resolve them.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn ClientStorage>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        let cart = CartStore::load(storage);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                customer: CustomerSession::new(api.clone()),
                admin: AdminSession::new(api.clone()),
                cart: Mutex::new(cart),
                notices: Notices::new(),
                api,
                config,
            }),
        })
    }

    /// Probe both sessions in the background.
    pub fn start_session_probes(&self) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let (customer, admin) = tokio::join!(state.customer().probe(), state.admin().probe());
            tracing::info!(
                customer = customer.identity().is_some(),
                admin = admin.identity().is_some(),
                "Session probes finished"
            );
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the store API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// The persistent cart.
    #[must_use]
    pub fn cart(&self) -> &Mutex<CartStore> {
        &self.inner.cart
    }

    /// The customer session context.
    #[must_use]
    pub fn customer(&self) -> &CustomerSession {
        &self.inner.customer
    }

    /// The administrator session context.
    #[must_use]
    pub fn admin(&self) -> &AdminSession {
        &self.inner.admin
    }

    /// Per-screen status messages.
    #[must_use]
    pub fn notices(&self) -> &Notices {
        &self.inner.notices
    }
}
