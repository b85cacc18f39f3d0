//! Customer and administrator session contexts.
//!
//! The store API keeps the session in a cookie; a [`SessionContext`] mirrors
//! who that cookie belongs to so views and guards can decide without a round
//! trip. Both contexts share one shape, parameterised by a [`Principal`].
//!
//! # Lifecycle
//!
//! ```text
//! Loading --probe--> Authenticated(identity) | Anonymous
//! *       --login/register ok--> Authenticated(identity)
//! *       --logout (always)--> Anonymous
//! ```
//!
//! Every login, registration, profile update and logout bumps an epoch. A
//! probe that started under an older epoch discards its answer, so a slow
//! startup probe can never overwrite a newer sign-in.

use std::sync::Arc;

use chrono::NaiveDateTime;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use folio_core::{AdminUser, Customer};

use crate::api::wire::IdentityEnvelope;
use crate::api::{ApiClient, ApiError, CONNECTION_ERROR_MESSAGE, ProfileUpdate};
use crate::error::{clear_sentry_user, set_sentry_user};

// =============================================================================
// Principal
// =============================================================================

/// An identity the store API can sign in.
pub trait Principal: Clone + Send + Sync + DeserializeOwned + 'static {
    /// Short label used in logs.
    const KIND: &'static str;
    /// Status probe endpoint.
    const STATUS_PATH: &'static str;
    /// Login endpoint.
    const LOGIN_PATH: &'static str;
    /// Logout endpoint.
    const LOGOUT_PATH: &'static str;
    /// Local view to redirect to when a guard rejects.
    const LOGIN_ROUTE: &'static str;

    /// Login request body in the API's vocabulary.
    fn login_body(credentials: &Credentials) -> serde_json::Value;

    /// Name shown in the header.
    fn display_name(&self) -> &str;

    /// Email address, when the identity has one.
    fn email(&self) -> Option<&str>;

    /// When the account was created.
    fn registered_at(&self) -> Option<NaiveDateTime>;

    /// Stable identifier for error reports.
    fn report_id(&self) -> String;
}

impl Principal for Customer {
    const KIND: &'static str = "customer";
    const STATUS_PATH: &'static str = "clientes/status";
    const LOGIN_PATH: &'static str = "clientes/login";
    const LOGOUT_PATH: &'static str = "clientes/logout";
    const LOGIN_ROUTE: &'static str = "/login";

    fn login_body(credentials: &Credentials) -> serde_json::Value {
        serde_json::json!({
            "email": credentials.login,
            "senha": credentials.password.expose_secret(),
        })
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn email(&self) -> Option<&str> {
        Some(self.email.as_str())
    }

    fn registered_at(&self) -> Option<NaiveDateTime> {
        self.registered_at
    }

    fn report_id(&self) -> String {
        format!("customer:{}", self.id)
    }
}

impl Principal for AdminUser {
    const KIND: &'static str = "admin";
    const STATUS_PATH: &'static str = "admin/status";
    const LOGIN_PATH: &'static str = "admin/login";
    const LOGOUT_PATH: &'static str = "admin/logout";
    const LOGIN_ROUTE: &'static str = "/admin/login";

    fn login_body(credentials: &Credentials) -> serde_json::Value {
        serde_json::json!({
            "usuario": credentials.login,
            "senha": credentials.password.expose_secret(),
        })
    }

    fn display_name(&self) -> &str {
        &self.username
    }

    fn email(&self) -> Option<&str> {
        None
    }

    fn registered_at(&self) -> Option<NaiveDateTime> {
        self.created_at
    }

    fn report_id(&self) -> String {
        format!("admin:{}", self.id)
    }
}

// =============================================================================
// Credentials & Results
// =============================================================================

/// Login name (email or username) and password.
#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into().trim().to_string(),
            password: SecretString::from(password.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of a session operation. Session operations never fail with an
/// error; everything the user needs to know is in the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Success { message: String },
    Failure { message: String },
}

impl AuthResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message } | Self::Failure { message } => message,
        }
    }

    fn success(message: Option<String>, fallback: &str) -> Self {
        Self::Success {
            message: message.unwrap_or_else(|| fallback.to_string()),
        }
    }

    fn failure(error: &ApiError) -> Self {
        Self::Failure {
            message: error.user_message(),
        }
    }
}

// =============================================================================
// SessionContext
// =============================================================================

/// What a context currently knows about its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState<P> {
    /// The startup probe has not answered yet.
    Loading,
    Anonymous,
    Authenticated(P),
}

impl<P> SessionState<P> {
    /// The identity, if signed in.
    pub const fn identity(&self) -> Option<&P> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Loading | Self::Anonymous => None,
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[derive(Debug)]
struct Shared<P> {
    state: SessionState<P>,
    epoch: u64,
}

/// Session context for one kind of principal.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct SessionContext<P> {
    api: ApiClient,
    shared: Arc<RwLock<Shared<P>>>,
}

/// Customer session context.
pub type CustomerSession = SessionContext<Customer>;
/// Administrator session context.
pub type AdminSession = SessionContext<AdminUser>;

impl<P: Principal> SessionContext<P> {
    /// A context in the [`SessionState::Loading`] state. Call
    /// [`probe`](Self::probe) to resolve it.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            shared: Arc::new(RwLock::new(Shared {
                state: SessionState::Loading,
                epoch: 0,
            })),
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> SessionState<P> {
        self.shared.read().await.state.clone()
    }

    /// The signed-in identity, if any.
    pub async fn identity(&self) -> Option<P> {
        self.shared.read().await.state.identity().cloned()
    }

    /// Ask the API who the session cookie belongs to.
    ///
    /// Any failure leaves the context anonymous.
    #[instrument(skip(self), fields(kind = P::KIND))]
    pub async fn probe(&self) -> SessionState<P> {
        let epoch = self.shared.read().await.epoch;

        let identity = match self.api.session_status::<P>(P::STATUS_PATH).await {
            Ok(status) => status.into_identity(),
            Err(e) => {
                warn!(error = %e, "Session probe failed");
                None
            }
        };

        let mut shared = self.shared.write().await;
        if shared.epoch != epoch {
            // A login or logout finished while the probe was in flight.
            return shared.state.clone();
        }
        shared.state = identity.map_or(SessionState::Anonymous, SessionState::Authenticated);
        shared.state.clone()
    }

    /// Sign in.
    #[instrument(skip(self, credentials), fields(kind = P::KIND, login = %credentials.login))]
    pub async fn login(&self, credentials: &Credentials) -> AuthResult {
        let body = P::login_body(credentials);
        match self.api.session_login::<P>(P::LOGIN_PATH, &body).await {
            Ok(envelope) => self.accept(envelope, "Signed in").await,
            Err(e) => {
                info!(error = %e, "Login rejected");
                AuthResult::failure(&e)
            }
        }
    }

    /// Sign out. The local identity is cleared whatever the API answers.
    #[instrument(skip(self), fields(kind = P::KIND))]
    pub async fn logout(&self) {
        if let Err(e) = self.api.session_logout(P::LOGOUT_PATH).await {
            warn!(error = %e, "Logout request failed; clearing local session anyway");
        }
        self.set(SessionState::Anonymous).await;
        clear_sentry_user();
    }

    /// Forget the identity after the API reported the session gone.
    pub async fn expire(&self) {
        self.set(SessionState::Anonymous).await;
    }

    async fn set(&self, state: SessionState<P>) {
        let mut shared = self.shared.write().await;
        shared.state = state;
        shared.epoch += 1;
    }

    /// Store the identity from a successful response.
    async fn accept(&self, envelope: IdentityEnvelope<P>, fallback: &str) -> AuthResult {
        let Some(identity) = envelope.identity else {
            warn!("Successful response without an identity");
            return AuthResult::Failure {
                message: CONNECTION_ERROR_MESSAGE.to_string(),
            };
        };

        set_sentry_user(&identity.report_id(), identity.email());
        self.set(SessionState::Authenticated(identity)).await;
        AuthResult::success(envelope.message, fallback)
    }
}

impl SessionContext<Customer> {
    /// Create an account; the API signs the new customer in.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(&self, name: &str, email: &str, password: &SecretString) -> AuthResult {
        match self.api.register_customer(name, email, password).await {
            Ok(envelope) => self.accept(envelope, "Account created").await,
            Err(e) => AuthResult::failure(&e),
        }
    }

    /// Change name, email or password. The stored identity is replaced with
    /// the API's answer.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> AuthResult {
        match self.api.update_profile(update).await {
            Ok(envelope) => self.accept(envelope, "Profile updated").await,
            Err(e) => {
                if e.is_unauthorized() {
                    self.expire().await;
                }
                AuthResult::failure(&e)
            }
        }
    }
}

impl SessionContext<AdminUser> {
    /// Create the first administrator. Does not sign anyone in.
    #[instrument(skip(self, credentials), fields(username = %credentials.login))]
    pub async fn create_first_admin(&self, credentials: &Credentials) -> AuthResult {
        match self
            .api
            .create_first_admin(&credentials.login, &credentials.password)
            .await
        {
            Ok(envelope) => AuthResult::success(envelope.message, "Administrator created"),
            Err(e) => AuthResult::failure(&e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_bodies_use_api_vocabulary() {
        let credentials = Credentials::new(" ana@example.com ", "s3cret!");
        assert_eq!(
            Customer::login_body(&credentials),
            serde_json::json!({"email": "ana@example.com", "senha": "s3cret!"})
        );
        assert_eq!(
            AdminUser::login_body(&Credentials::new("root", "p")),
            serde_json::json!({"usuario": "root", "senha": "p"})
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("root", "hunter22"));
        assert!(debug.contains("root"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_auth_result_message() {
        let ok = AuthResult::success(None, "Signed in");
        assert!(ok.is_success());
        assert_eq!(ok.message(), "Signed in");

        let err = AuthResult::failure(&ApiError::Server {
            status: reqwest::StatusCode::UNAUTHORIZED,
            message: Some("bad credentials".to_string()),
        });
        assert!(!err.is_success());
        assert_eq!(err.message(), "bad credentials");
    }

    #[tokio::test]
    async fn test_new_context_is_loading() {
        let api = ApiClient::with_base_url(
            url::Url::parse("http://127.0.0.1:9/api/").unwrap(),
            std::time::Duration::from_secs(1),
        )
        .unwrap();
        let session = CustomerSession::new(api);
        assert!(session.state().await.is_loading());
        assert!(session.identity().await.is_none());

        session.expire().await;
        assert_eq!(session.state().await, SessionState::Anonymous);
    }
}
