//! Back-office dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use folio_core::{DashboardStats, ProductSalesCount};

use super::{Loaded, load};
use crate::guards::RequireAdmin;
use crate::notices::Screen;
use crate::routes::{Layout, money};
use crate::state::AppState;

/// Dashboard figures for templates.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub total_products: u64,
    pub total_customers: u64,
    pub total_sales: u64,
    pub total_revenue: String,
    pub recent_sales: u64,
    pub top_products: Vec<ProductSalesCount>,
}

impl DashboardView {
    fn new(state: &AppState, stats: DashboardStats) -> Self {
        Self {
            total_products: stats.total_products,
            total_customers: stats.total_customers,
            total_sales: stats.total_sales,
            total_revenue: money(state, stats.total_revenue),
            recent_sales: stats.recent_sales,
            top_products: stats.top_products,
        }
    }
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub stats: Option<DashboardView>,
}

/// Display the dashboard.
#[instrument(skip(state, _admin))]
pub async fn show(State(state): State<AppState>, RequireAdmin(_admin): RequireAdmin) -> Response {
    let layout = Layout::load(&state, Screen::AdminDashboard).await;
    let (stats, layout) = match load(&state, "/admin/dashboard", state.api().dashboard().await).await
    {
        Loaded::Ready(stats) => (Some(DashboardView::new(&state, stats)), layout),
        Loaded::Failed(message) => (None, layout.or_notice(Some(message))),
        Loaded::Expired(response) => return response,
    };

    DashboardTemplate { layout, stats }.into_response()
}
