//! Back-office sales list and statistics.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use folio_core::{ProductSalesCount, Sale, SaleId, SaleStatus, SalesStatistics};

use super::{Loaded, load};
use crate::guards::RequireAdmin;
use crate::notices::{Screen, StatusMessage};
use crate::routes::{Layout, format_timestamp, money, notify, report_failure};
use crate::state::AppState;

const SALES: &str = "/admin/sales";

/// Sale row for templates.
#[derive(Debug, Clone)]
pub struct SaleRow {
    pub id: SaleId,
    pub customer: String,
    pub product: String,
    pub sold_at: String,
    pub total: String,
    pub status: SaleStatus,
    pub email_sent: bool,
}

impl SaleRow {
    fn new(state: &AppState, sale: Sale) -> Self {
        Self {
            id: sale.id,
            customer: sale
                .customer_name
                .unwrap_or_else(|| format!("Customer #{}", sale.customer_id)),
            product: sale
                .product_name
                .unwrap_or_else(|| format!("Product #{}", sale.product_id)),
            sold_at: format_timestamp(sale.sold_at),
            total: money(state, sale.total_price),
            status: sale.status,
            email_sent: sale.email_sent,
        }
    }
}

/// One status and its sale count.
#[derive(Debug, Clone)]
pub struct StatusCount {
    pub label: &'static str,
    pub count: u64,
}

/// Statistics for templates.
#[derive(Debug, Clone)]
pub struct StatisticsView {
    pub total_sales: u64,
    pub total_revenue: String,
    pub by_status: Vec<StatusCount>,
    pub top_products: Vec<ProductSalesCount>,
}

impl StatisticsView {
    fn new(state: &AppState, stats: SalesStatistics) -> Self {
        Self {
            total_sales: stats.total_sales,
            total_revenue: money(state, stats.total_revenue),
            by_status: SaleStatus::ALL
                .iter()
                .map(|status| StatusCount {
                    label: status.label(),
                    count: stats.count_for(*status),
                })
                .collect(),
            top_products: stats.top_products,
        }
    }
}

/// Sales page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/sales.html")]
pub struct SalesTemplate {
    pub layout: Layout,
    pub sales: Vec<SaleRow>,
    pub statistics: Option<StatisticsView>,
    pub statuses: [SaleStatus; 3],
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// List sales with statistics.
#[instrument(skip(state, _admin))]
pub async fn index(State(state): State<AppState>, RequireAdmin(_admin): RequireAdmin) -> Response {
    let layout = Layout::load(&state, Screen::AdminSales).await;
    let (sales, stats) = tokio::join!(state.api().list_sales(), state.api().sales_statistics());

    let (sales, layout) = match load(&state, SALES, sales).await {
        Loaded::Ready(sales) => (sales, layout),
        Loaded::Failed(message) => (Vec::new(), layout.or_notice(Some(message))),
        Loaded::Expired(response) => return response,
    };
    let (statistics, layout) = match load(&state, SALES, stats).await {
        Loaded::Ready(stats) => (Some(StatisticsView::new(&state, stats)), layout),
        Loaded::Failed(message) => (None, layout.or_notice(Some(message))),
        Loaded::Expired(response) => return response,
    };

    SalesTemplate {
        layout,
        sales: sales.into_iter().map(|s| SaleRow::new(&state, s)).collect(),
        statistics,
        statuses: SaleStatus::ALL,
    }
    .into_response()
}

/// Change a sale's status.
#[instrument(skip(state, _admin))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<SaleId>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let status = match form.status.parse::<SaleStatus>() {
        Ok(status) => status,
        Err(message) => {
            return notify(&state, Screen::AdminSales, StatusMessage::error(message), SALES);
        }
    };

    match state.api().update_sale_status(id, status).await {
        Ok(envelope) => notify(
            &state,
            Screen::AdminSales,
            StatusMessage::success(
                envelope
                    .message
                    .unwrap_or_else(|| format!("Sale #{id} marked {}", status.label())),
            ),
            SALES,
        ),
        Err(e) => report_failure(&state, state.admin(), Screen::AdminSales, &e, SALES).await,
    }
}
