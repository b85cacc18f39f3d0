//! Back-office customer list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use folio_core::CustomerId;

use super::{Loaded, load};
use crate::guards::RequireAdmin;
use crate::notices::{Screen, StatusMessage};
use crate::routes::{Layout, format_timestamp, notify, report_failure};
use crate::state::AppState;

const CUSTOMERS: &str = "/admin/customers";

/// Customer row for templates.
#[derive(Debug, Clone)]
pub struct CustomerRow {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub registered_at: String,
    pub active: bool,
}

/// Customers page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/customers.html")]
pub struct CustomersTemplate {
    pub layout: Layout,
    pub customers: Vec<CustomerRow>,
}

/// Activation form data.
#[derive(Debug, Deserialize)]
pub struct ActiveForm {
    pub active: bool,
}

/// List customers.
#[instrument(skip(state, _admin))]
pub async fn index(State(state): State<AppState>, RequireAdmin(_admin): RequireAdmin) -> Response {
    let layout = Layout::load(&state, Screen::AdminCustomers).await;
    let (customers, layout) =
        match load(&state, CUSTOMERS, state.api().list_customers().await).await {
            Loaded::Ready(customers) => (customers, layout),
            Loaded::Failed(message) => (Vec::new(), layout.or_notice(Some(message))),
            Loaded::Expired(response) => return response,
        };

    let customers = customers
        .into_iter()
        .map(|c| CustomerRow {
            id: c.id,
            name: c.name,
            email: c.email.into_inner(),
            registered_at: format_timestamp(c.registered_at),
            active: c.active,
        })
        .collect();

    CustomersTemplate { layout, customers }.into_response()
}

/// Activate or deactivate a customer.
#[instrument(skip(state, _admin))]
pub async fn set_active(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CustomerId>,
    Form(form): Form<ActiveForm>,
) -> Redirect {
    match state.api().set_customer_active(id, form.active).await {
        Ok(envelope) => {
            let fallback = if form.active {
                "Customer activated"
            } else {
                "Customer deactivated"
            };
            notify(
                &state,
                Screen::AdminCustomers,
                StatusMessage::success(envelope.message.unwrap_or_else(|| fallback.to_string())),
                CUSTOMERS,
            )
        }
        Err(e) => report_failure(&state, state.admin(), Screen::AdminCustomers, &e, CUSTOMERS).await,
    }
}
