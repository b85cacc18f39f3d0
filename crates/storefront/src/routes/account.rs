//! Customer account routes: profile, purchase history, PDF resend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use folio_core::{Sale, SaleId};

use super::{Layout, format_timestamp, money, non_blank, notify, report_failure};
use crate::api::ProfileUpdate;
use crate::guards::{RequireCustomer, login_redirect};
use crate::notices::{Screen, StatusMessage};
use crate::session::AuthResult;
use crate::state::AppState;

/// Purchase display data for templates.
#[derive(Debug, Clone)]
pub struct PurchaseView {
    pub id: SaleId,
    pub product_name: String,
    pub sold_at: String,
    pub total: String,
    pub status: String,
    pub email_sent: bool,
}

impl PurchaseView {
    fn new(state: &AppState, sale: &Sale) -> Self {
        Self {
            id: sale.id,
            product_name: sale
                .product_name
                .clone()
                .unwrap_or_else(|| format!("Product #{}", sale.product_id)),
            sold_at: format_timestamp(sale.sold_at),
            total: money(state, sale.total_price),
            status: sale.status.label().to_string(),
            email_sent: sale.email_sent,
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub registered_at: String,
    pub purchases: Vec<PurchaseView>,
}

/// Profile form data. Blank fields are left unchanged.
#[derive(Deserialize)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Display the profile and purchase history.
#[instrument(skip(state, customer))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
) -> Response {
    let (purchases, load_error) = match state.api().my_purchases().await {
        Ok(sales) => (
            sales.iter().map(|s| PurchaseView::new(&state, s)).collect(),
            None,
        ),
        Err(e) if e.is_unauthorized() => {
            state.customer().expire().await;
            return Redirect::to(&login_redirect("/login", "/profile")).into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load purchases");
            (Vec::new(), Some(StatusMessage::error(e.user_message())))
        }
    };

    ProfileTemplate {
        layout: Layout::load(&state, Screen::Profile)
            .await
            .or_notice(load_error),
        name: customer.name,
        email: customer.email.into_inner(),
        registered_at: format_timestamp(customer.registered_at),
        purchases,
    }
    .into_response()
}

/// Handle the profile form.
///
/// Only fields that are filled in and differ from the current identity are
/// sent.
#[instrument(skip(state, customer, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Form(form): Form<ProfileForm>,
) -> Redirect {
    let update = ProfileUpdate {
        name: non_blank(form.name).filter(|name| *name != customer.name),
        email: non_blank(form.email).filter(|email| email != customer.email.as_str()),
        password: non_blank(form.password).map(SecretString::from),
    };

    if update.is_empty() {
        return notify(
            &state,
            Screen::Profile,
            StatusMessage::error("Nothing to update"),
            "/profile",
        );
    }

    let message = match state.customer().update_profile(&update).await {
        AuthResult::Success { message } => StatusMessage::success(message),
        AuthResult::Failure { message } => StatusMessage::error(message),
    };
    notify(&state, Screen::Profile, message, "/profile")
}

/// Ask the API to email a purchased PDF again.
#[instrument(skip(state, _customer))]
pub async fn resend(
    State(state): State<AppState>,
    RequireCustomer(_customer): RequireCustomer,
    Path(id): Path<SaleId>,
) -> Redirect {
    match state.api().resend_email(id).await {
        Ok(receipt) if receipt.email_sent => notify(
            &state,
            Screen::Profile,
            StatusMessage::success("Email sent"),
            "/profile",
        ),
        Ok(receipt) => {
            let mut message = StatusMessage::error("The email could not be sent");
            if let Some(reason) = receipt.email_message {
                message = message.with_details(reason);
            }
            notify(&state, Screen::Profile, message, "/profile")
        }
        Err(e) => report_failure(&state, state.customer(), Screen::Profile, &e, "/profile").await,
    }
}
