//! Product listing and detail pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use folio_core::{Product, ProductId};

use super::{Layout, money};
use crate::error::{self, AppError};
use crate::guards::OptionalCustomer;
use crate::notices::{Screen, StatusMessage};
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub cover_image: Option<String>,
}

impl ProductView {
    fn new(state: &AppState, product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: money(state, product.price),
            cover_image: product.cover_image.clone(),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogTemplate {
    pub layout: Layout,
    pub products: Vec<ProductView>,
    pub signed_in: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/show.html")]
pub struct ProductTemplate {
    pub layout: Layout,
    pub product: ProductView,
    pub signed_in: bool,
}

/// Display the active products.
///
/// Add-to-cart buttons are only offered to signed-in customers.
#[instrument(skip(state, customer))]
pub async fn index(
    State(state): State<AppState>,
    OptionalCustomer(customer): OptionalCustomer,
) -> impl IntoResponse {
    let (products, load_error) = match state.api().list_products().await {
        Ok(products) => (
            products
                .iter()
                .filter(|p| p.active)
                .map(|p| ProductView::new(&state, p))
                .collect(),
            None,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load products");
            (Vec::new(), Some(StatusMessage::error(e.user_message())))
        }
    };

    CatalogTemplate {
        layout: Layout::load(&state, Screen::Catalog).await.or_notice(load_error),
        products,
        signed_in: customer.is_some(),
    }
}

/// Display one product.
#[instrument(skip(state, customer), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    OptionalCustomer(customer): OptionalCustomer,
    Path(id): Path<ProductId>,
) -> error::Result<Response> {
    let product = state.api().get_product(id).await?;
    if !product.active {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    Ok(ProductTemplate {
        layout: Layout::load(&state, Screen::Catalog).await,
        product: ProductView::new(&state, &product),
        signed_in: customer.is_some(),
    }
    .into_response())
}
