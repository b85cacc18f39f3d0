//! Route guards.
//!
//! A guard is a pure function of the session state: render when an identity
//! is present, wait while the startup probe is still out, otherwise send the
//! visitor to the login view with a `next` parameter pointing back.
//!
//! The extractors below wire [`evaluate`] into axum handlers.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn profile(RequireCustomer(customer): RequireCustomer) -> impl IntoResponse {
//!     format!("Hello, {}!", customer.name)
//! }
//! ```

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use folio_core::{AdminUser, Customer};

use crate::session::{Principal, SessionContext, SessionState};
use crate::state::AppState;

/// What a protected view should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision<P> {
    Render(P),
    /// The session probe has not answered yet.
    Pending,
    /// Go to this location (the login view).
    Redirect(String),
}

/// Decide how a view protected by `P`'s session handles a request for
/// `requested` (path and query).
#[must_use]
pub fn evaluate<P: Principal>(state: &SessionState<P>, requested: &str) -> GuardDecision<P> {
    match state {
        SessionState::Authenticated(identity) => GuardDecision::Render(identity.clone()),
        SessionState::Loading => GuardDecision::Pending,
        SessionState::Anonymous => GuardDecision::Redirect(login_redirect(P::LOGIN_ROUTE, requested)),
    }
}

/// `login_route?next=<requested>`, or the bare route when `requested` is not
/// a safe local path.
#[must_use]
pub fn login_redirect(login_route: &str, requested: &str) -> String {
    if is_local_path(requested) {
        format!("{login_route}?next={}", urlencoding::encode(requested))
    } else {
        login_route.to_string()
    }
}

/// The post-login destination: `next` when it is a local path, `fallback`
/// otherwise.
#[must_use]
pub fn safe_next(next: Option<&str>, fallback: &str) -> String {
    next.map(str::trim)
        .filter(|next| is_local_path(next))
        .unwrap_or(fallback)
        .to_string()
}

/// Accept `/path` but not `//host`, `/\host` or absolute URLs.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(char::is_control)
}

// =============================================================================
// Extractors
// =============================================================================

/// Page shown while the session probe is outstanding; reloads itself.
#[derive(Template, WebTemplate)]
#[template(path = "loading.html")]
pub struct LoadingTemplate {
    pub retry: String,
}

/// Why a guard did not let the request through.
#[derive(Debug)]
pub enum GuardRejection {
    /// Show the loading page, then retry this location.
    Pending(String),
    /// Redirect to the login view.
    RedirectToLogin(String),
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Pending(retry) => LoadingTemplate { retry }.into_response(),
            Self::RedirectToLogin(location) => Redirect::to(&location).into_response(),
        }
    }
}

/// The full location the visitor asked for. Nested routers see `parts.uri`
/// with their prefix stripped, so prefer the original URI.
fn requested_location(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);
    uri.path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string)
}

async fn require<P: Principal>(
    session: &SessionContext<P>,
    parts: &Parts,
) -> Result<P, GuardRejection> {
    let requested = requested_location(parts);
    match evaluate(&session.state().await, &requested) {
        GuardDecision::Render(identity) => Ok(identity),
        GuardDecision::Pending => Err(GuardRejection::Pending(requested)),
        GuardDecision::Redirect(location) => {
            tracing::debug!(kind = P::KIND, %requested, "Guard redirecting to login");
            Err(GuardRejection::RedirectToLogin(location))
        }
    }
}

/// Extractor that requires a signed-in customer.
pub struct RequireCustomer(pub Customer);

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = GuardRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(state.customer(), parts).await.map(Self)
    }
}

/// Extractor that requires a signed-in administrator.
pub struct RequireAdmin(pub AdminUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = GuardRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(state.admin(), parts).await.map(Self)
    }
}

/// Extractor that optionally gets the current customer.
///
/// Unlike `RequireCustomer`, this never rejects; a pending probe counts as
/// anonymous.
pub struct OptionalCustomer(pub Option<Customer>);

impl FromRequestParts<AppState> for OptionalCustomer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(state.customer().identity().await))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use folio_core::{CustomerId, Email};

    fn customer() -> Customer {
        Customer {
            id: CustomerId::new(1),
            name: "Ana".to_string(),
            email: Email::parse("ana@example.com").unwrap(),
            active: true,
            registered_at: None,
        }
    }

    #[test]
    fn test_authenticated_renders() {
        let state = SessionState::Authenticated(customer());
        assert_eq!(
            evaluate(&state, "/profile"),
            GuardDecision::Render(customer())
        );
    }

    #[test]
    fn test_loading_is_pending() {
        let state: SessionState<AdminUser> = SessionState::Loading;
        assert_eq!(evaluate(&state, "/admin/sales"), GuardDecision::Pending);
    }

    #[test]
    fn test_anonymous_redirects_to_matching_login() {
        let customer_state: SessionState<Customer> = SessionState::Anonymous;
        assert_eq!(
            evaluate(&customer_state, "/cart"),
            GuardDecision::Redirect("/login?next=%2Fcart".to_string())
        );

        let admin_state: SessionState<AdminUser> = SessionState::Anonymous;
        assert_eq!(
            evaluate(&admin_state, "/admin/products?edit=3"),
            GuardDecision::Redirect("/admin/login?next=%2Fadmin%2Fproducts%3Fedit%3D3".to_string())
        );
    }

    #[test]
    fn test_requested_location_keeps_nest_prefix() {
        let (mut parts, ()) = axum::http::Request::builder()
            .uri("/sales?page=2")
            .body(())
            .unwrap()
            .into_parts();
        parts
            .extensions
            .insert(OriginalUri("/admin/sales?page=2".parse().unwrap()));
        assert_eq!(requested_location(&parts), "/admin/sales?page=2");
    }

    #[test]
    fn test_requested_location_without_original_uri() {
        let (parts, ()) = axum::http::Request::builder()
            .uri("/profile")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(requested_location(&parts), "/profile");
    }

    #[test]
    fn test_safe_next_rejects_foreign_targets() {
        assert_eq!(safe_next(Some("/products/2"), "/"), "/products/2");
        assert_eq!(safe_next(Some("//evil.test/x"), "/"), "/");
        assert_eq!(safe_next(Some("/\\evil.test"), "/"), "/");
        assert_eq!(safe_next(Some("https://evil.test"), "/"), "/");
        assert_eq!(safe_next(Some(""), "/cart"), "/cart");
        assert_eq!(safe_next(None, "/cart"), "/cart");
    }
}
