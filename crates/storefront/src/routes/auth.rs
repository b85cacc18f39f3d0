//! Customer authentication route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use folio_core::Email;

use super::{Layout, notify};
use crate::guards::safe_next;
use crate::notices::{Screen, StatusMessage};
use crate::session::{AuthResult, Credentials};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Query parameters carrying the post-login destination.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub next: String,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub next: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display login page. Signed-in customers go straight to `next`.
#[instrument(skip(state))]
pub async fn login_page(State(state): State<AppState>, Query(query): Query<NextQuery>) -> Response {
    let next = safe_next(query.next.as_deref(), "/");
    if state.customer().identity().await.is_some() {
        return Redirect::to(&next).into_response();
    }

    LoginTemplate {
        layout: Layout::load(&state, Screen::Login).await,
        next,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Redirect {
    let next = safe_next(form.next.as_deref(), "/");
    let credentials = Credentials::new(form.email, form.password);

    match state.customer().login(&credentials).await {
        AuthResult::Success { message } => notify(
            &state,
            Screen::for_path(&next),
            StatusMessage::success(message),
            &next,
        ),
        AuthResult::Failure { message } => notify(
            &state,
            Screen::Login,
            StatusMessage::error(message),
            &back_to("/login", &next),
        ),
    }
}

/// Display registration page.
#[instrument(skip(state))]
pub async fn register_page(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref(), "/");
    if state.customer().identity().await.is_some() {
        return Redirect::to(&next).into_response();
    }

    RegisterTemplate {
        layout: Layout::load(&state, Screen::Register).await,
        next,
    }
    .into_response()
}

/// Handle registration form submission.
///
/// A malformed email is rejected before calling the API; everything else is
/// the API's call.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Redirect {
    let next = safe_next(form.next.as_deref(), "/");
    let back = back_to("/register", &next);

    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => {
            return notify(&state, Screen::Register, StatusMessage::error(e.to_string()), &back);
        }
    };

    let password = SecretString::from(form.password);
    match state
        .customer()
        .register(form.name.trim(), email.as_str(), &password)
        .await
    {
        AuthResult::Success { message } => notify(
            &state,
            Screen::for_path(&next),
            StatusMessage::success(message),
            &next,
        ),
        AuthResult::Failure { message } => {
            notify(&state, Screen::Register, StatusMessage::error(message), &back)
        }
    }
}

/// Handle logout.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Redirect {
    state.customer().logout().await;
    notify(
        &state,
        Screen::Catalog,
        StatusMessage::success("Signed out"),
        "/",
    )
}

/// The form page again, keeping a non-default `next`.
fn back_to(page: &str, next: &str) -> String {
    if next == "/" {
        page.to_string()
    } else {
        format!("{page}?next={}", urlencoding::encode(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_to_keeps_next() {
        assert_eq!(back_to("/login", "/"), "/login");
        assert_eq!(back_to("/login", "/cart"), "/login?next=%2Fcart");
    }
}
