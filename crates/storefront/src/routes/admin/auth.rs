//! Administrator login, logout and first-admin bootstrap.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::guards::safe_next;
use crate::notices::{Screen, StatusMessage};
use crate::routes::auth::NextQuery;
use crate::routes::{Layout, notify};
use crate::session::{AuthResult, Credentials};
use crate::state::AppState;

const DASHBOARD: &str = "/admin/dashboard";

/// Administrator login form data.
#[derive(Deserialize)]
pub struct AdminLoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

/// First administrator form data.
#[derive(Deserialize)]
pub struct BootstrapForm {
    pub username: String,
    pub password: String,
}

/// Administrator login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub layout: Layout,
    pub next: String,
}

/// `/admin` has no page of its own.
pub async fn index() -> Redirect {
    Redirect::to("/admin/login")
}

/// Display the login and bootstrap forms. Signed-in administrators go
/// straight to `next`.
#[instrument(skip(state))]
pub async fn login_page(State(state): State<AppState>, Query(query): Query<NextQuery>) -> Response {
    let next = safe_next(query.next.as_deref(), DASHBOARD);
    if state.admin().identity().await.is_some() {
        return Redirect::to(&next).into_response();
    }

    AdminLoginTemplate {
        layout: Layout::load(&state, Screen::AdminLogin).await,
        next,
    }
    .into_response()
}

/// Handle administrator login.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login(State(state): State<AppState>, Form(form): Form<AdminLoginForm>) -> Redirect {
    let next = safe_next(form.next.as_deref(), DASHBOARD);
    let credentials = Credentials::new(form.username, form.password);

    match state.admin().login(&credentials).await {
        AuthResult::Success { message } => notify(
            &state,
            Screen::for_path(&next),
            StatusMessage::success(message),
            &next,
        ),
        AuthResult::Failure { message } => notify(
            &state,
            Screen::AdminLogin,
            StatusMessage::error(message),
            "/admin/login",
        ),
    }
}

/// Create the first administrator. The new account still has to log in.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn bootstrap(State(state): State<AppState>, Form(form): Form<BootstrapForm>) -> Redirect {
    let credentials = Credentials::new(form.username, form.password);
    let message = match state.admin().create_first_admin(&credentials).await {
        AuthResult::Success { message } => {
            StatusMessage::success(message).with_details("You can now log in.")
        }
        AuthResult::Failure { message } => StatusMessage::error(message),
    };
    notify(&state, Screen::AdminLogin, message, "/admin/login")
}

/// Handle administrator logout.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Redirect {
    state.admin().logout().await;
    notify(
        &state,
        Screen::AdminLogin,
        StatusMessage::success("Signed out"),
        "/admin/login",
    )
}
