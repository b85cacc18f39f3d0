//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Catalog (public)
//! GET  /                                - Product listing
//! GET  /products/{id}                   - Product detail
//!
//! # Cart (customer)
//! GET  /cart                            - Cart page
//! POST /cart/add                        - Add one unit (anonymous visitors go to login)
//! POST /cart/update                     - Set quantity
//! POST /cart/remove                     - Remove line
//! POST /cart/clear                      - Empty the cart
//! POST /cart/purchase                   - Buy one line's product
//!
//! # Customer auth
//! GET  /login, POST /login              - Sign in
//! GET  /register, POST /register        - Create account
//! POST /logout                          - Sign out
//!
//! # Account (customer)
//! GET  /profile, POST /profile          - Identity, edit form, purchase history
//! POST /profile/purchases/{id}/resend   - Email a purchased PDF again
//!
//! # Back-office
//! GET  /admin                           - Redirect to /admin/login
//! GET  /admin/login, POST /admin/login  - Administrator sign in
//! POST /admin/bootstrap                 - Create the first administrator
//! POST /admin/logout                    - Administrator sign out
//! GET  /admin/dashboard                 - Counters and top products
//! GET  /admin/products, POST            - List, create
//! POST /admin/products/{id}             - Update
//! POST /admin/products/{id}/deactivate  - Deactivate
//! GET  /admin/customers                 - List customers
//! POST /admin/customers/{id}/active     - Activate or deactivate
//! GET  /admin/sales                     - Sales and statistics
//! POST /admin/sales/{id}/status         - Change sale status
//! GET  /admin/settings, POST            - Branding and SMTP settings
//! POST /admin/settings/test-email       - Send a test email
//! ```
//!
//! Every POST follows post/redirect/get: the handler posts a status message
//! for the target screen and redirects there.

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::api::ApiError;
use crate::guards::login_redirect;
use crate::notices::{Screen, StatusMessage};
use crate::session::{Principal, SessionContext};
use crate::state::AppState;

// =============================================================================
// Layout
// =============================================================================

/// Data every page's header and banner need.
#[derive(Debug, Clone)]
pub struct Layout {
    pub store_name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub logo_path: Option<String>,
    pub customer_name: Option<String>,
    pub admin_name: Option<String>,
    pub cart_count: u64,
    pub notice: Option<StatusMessage>,
}

impl Layout {
    /// Gather header data and the live status message for `screen`.
    pub async fn load(state: &AppState, screen: Screen) -> Self {
        let branding = state.api().branding_or_default().await;
        let customer_name = state.customer().identity().await.map(|c| c.name);
        let admin_name = state.admin().identity().await.map(|a| a.username);
        let cart_count = state.cart().lock().await.item_count();

        Self {
            store_name: branding.store_name,
            primary_color: branding.primary_color,
            secondary_color: branding.secondary_color,
            logo_path: branding.logo_path,
            customer_name,
            admin_name,
            cart_count,
            notice: state.notices().current(screen),
        }
    }

    /// Show `message` on this render only, unless a posted message exists.
    #[must_use]
    pub fn or_notice(mut self, message: Option<StatusMessage>) -> Self {
        if self.notice.is_none() {
            self.notice = message;
        }
        self
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Format an amount in the configured currency.
pub(crate) fn money(state: &AppState, amount: Decimal) -> String {
    state.config().currency.format(amount)
}

/// Format a timestamp from the API for display.
pub(crate) fn format_timestamp(value: Option<NaiveDateTime>) -> String {
    value.map_or_else(
        || "-".to_string(),
        |at| at.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Treat blank form fields as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Post `message` for `screen` and redirect to `to`.
pub(crate) fn notify(state: &AppState, screen: Screen, message: StatusMessage, to: &str) -> Redirect {
    state.notices().post(screen, message);
    Redirect::to(to)
}

/// Report a failed API call from a protected view.
///
/// A 401 means the remote session is gone: the context is cleared and the
/// visitor sent to log in again. Anything else becomes an error banner.
pub(crate) async fn report_failure<P: Principal>(
    state: &AppState,
    session: &SessionContext<P>,
    screen: Screen,
    error: &ApiError,
    back: &str,
) -> Redirect {
    if error.is_unauthorized() {
        session.expire().await;
        return Redirect::to(&login_redirect(P::LOGIN_ROUTE, back));
    }
    notify(state, screen, StatusMessage::error(error.user_message()), back)
}

// =============================================================================
// Routers
// =============================================================================

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/purchase", post(cart::purchase))
}

/// Create the back-office routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::auth::index))
        .route("/login", get(admin::auth::login_page).post(admin::auth::login))
        .route("/bootstrap", post(admin::auth::bootstrap))
        .route("/logout", post(admin::auth::logout))
        .route("/dashboard", get(admin::dashboard::show))
        .route(
            "/products",
            get(admin::products::index).post(admin::products::create),
        )
        .route("/products/{id}", post(admin::products::update))
        .route("/products/{id}/deactivate", post(admin::products::deactivate))
        .route("/customers", get(admin::customers::index))
        .route("/customers/{id}/active", post(admin::customers::set_active))
        .route("/sales", get(admin::sales::index))
        .route("/sales/{id}/status", post(admin::sales::update_status))
        .route(
            "/settings",
            get(admin::settings::show).post(admin::settings::save),
        )
        .route("/settings/test-email", post(admin::settings::test_email))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Catalog
        .route("/", get(catalog::index))
        .route("/products/{id}", get(catalog::show))
        // Cart
        .nest("/cart", cart_routes())
        // Customer auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        // Account
        .route("/profile", get(account::show).post(account::update))
        .route("/profile/purchases/{id}/resend", post(account::resend))
        // Back-office
        .nest("/admin", admin_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
