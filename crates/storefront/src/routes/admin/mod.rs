//! Back-office route handlers.
//!
//! Every view except the login page is behind [`RequireAdmin`](crate::guards::RequireAdmin).
//! When the API answers 401 the administrator context is cleared and the
//! visitor is sent back to `/admin/login`.

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod products;
pub mod sales;
pub mod settings;

use axum::response::{IntoResponse, Redirect, Response};

use crate::api::ApiError;
use crate::guards::login_redirect;
use crate::notices::StatusMessage;
use crate::state::AppState;

/// Outcome of loading data for a back-office page.
enum Loaded<T> {
    Ready(T),
    /// Render the page empty with this banner.
    Failed(StatusMessage),
    /// The session is gone; send this response.
    Expired(Response),
}

/// Classify a load result for the page at `path`.
async fn load<T>(state: &AppState, path: &str, result: Result<T, ApiError>) -> Loaded<T> {
    match result {
        Ok(value) => Loaded::Ready(value),
        Err(e) if e.is_unauthorized() => {
            state.admin().expire().await;
            Loaded::Expired(Redirect::to(&login_redirect("/admin/login", path)).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, %path, "Failed to load back-office data");
            Loaded::Failed(StatusMessage::error(e.user_message()))
        }
    }
}
