//! Back-office product management.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use folio_core::{Product, ProductId, ProductInput};

use super::{Loaded, load};
use crate::guards::RequireAdmin;
use crate::notices::{Screen, StatusMessage};
use crate::routes::{Layout, format_timestamp, money, non_blank, notify, report_failure};
use crate::state::AppState;

const PRODUCTS: &str = "/admin/products";

/// Product row for templates.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub has_pdf: bool,
    pub active: bool,
    pub created_at: String,
}

/// Values pre-filled in the product form.
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    /// `None` when creating.
    pub id: Option<ProductId>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub pdf_path: String,
    pub cover_image: String,
}

impl ProductFormView {
    fn editing(product: &Product) -> Self {
        Self {
            id: Some(product.id),
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.normalize().to_string(),
            pdf_path: product.pdf_path.clone().unwrap_or_default(),
            cover_image: product.cover_image.clone().unwrap_or_default(),
        }
    }

    /// Where the form posts to.
    #[must_use]
    pub fn action(&self) -> String {
        self.id
            .map_or_else(|| PRODUCTS.to_string(), |id| format!("{PRODUCTS}/{id}"))
    }
}

/// Products page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products.html")]
pub struct ProductsTemplate {
    pub layout: Layout,
    pub products: Vec<ProductRow>,
    pub form: ProductFormView,
}

/// `?edit=<id>` opens the form on an existing product.
#[derive(Debug, Deserialize)]
pub struct EditQuery {
    pub edit: Option<ProductId>,
}

/// Product form data.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub pdf_path: Option<String>,
    pub cover_image: Option<String>,
}

impl ProductForm {
    /// Validate into an API body.
    fn into_input(self) -> Result<ProductInput, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }

        let price = parse_price(&self.price)?;
        Ok(ProductInput {
            name,
            description: non_blank(self.description),
            price,
            pdf_path: non_blank(self.pdf_path),
            cover_image: non_blank(self.cover_image),
        })
    }
}

/// Parse a non-negative price, accepting `,` as the decimal separator.
fn parse_price(raw: &str) -> Result<Decimal, String> {
    let normalized = raw.trim().replace(',', ".");
    let price = Decimal::from_str(&normalized).map_err(|_| format!("Invalid price: {raw}"))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err("Price cannot be negative".to_string());
    }
    Ok(price)
}

/// List products, with the create or edit form.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<EditQuery>,
) -> Response {
    let layout = Layout::load(&state, Screen::AdminProducts).await;
    let (products, layout) = match load(&state, PRODUCTS, state.api().list_products().await).await
    {
        Loaded::Ready(products) => (products, layout),
        Loaded::Failed(message) => (Vec::new(), layout.or_notice(Some(message))),
        Loaded::Expired(response) => return response,
    };

    let form = query
        .edit
        .and_then(|id| products.iter().find(|p| p.id == id))
        .map(ProductFormView::editing)
        .unwrap_or_default();

    let products = products
        .iter()
        .map(|p| ProductRow {
            id: p.id,
            name: p.name.clone(),
            price: money(&state, p.price),
            has_pdf: p.pdf_path.is_some(),
            active: p.active,
            created_at: format_timestamp(p.created_at),
        })
        .collect();

    ProductsTemplate {
        layout,
        products,
        form,
    }
    .into_response()
}

/// Create a product.
#[instrument(skip(state, _admin, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Redirect {
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => {
            return notify(&state, Screen::AdminProducts, StatusMessage::error(message), PRODUCTS);
        }
    };

    match state.api().create_product(&input).await {
        Ok(product) => notify(
            &state,
            Screen::AdminProducts,
            StatusMessage::success(format!("Product \"{}\" created", product.name)),
            PRODUCTS,
        ),
        Err(e) => report_failure(&state, state.admin(), Screen::AdminProducts, &e, PRODUCTS).await,
    }
}

/// Update a product.
#[instrument(skip(state, _admin, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Redirect {
    let back = format!("{PRODUCTS}?edit={id}");
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => {
            return notify(&state, Screen::AdminProducts, StatusMessage::error(message), &back);
        }
    };

    match state.api().update_product(id, &input).await {
        Ok(product) => notify(
            &state,
            Screen::AdminProducts,
            StatusMessage::success(format!("Product \"{}\" updated", product.name)),
            PRODUCTS,
        ),
        Err(e) => report_failure(&state, state.admin(), Screen::AdminProducts, &e, &back).await,
    }
}

/// Deactivate a product.
#[instrument(skip(state, _admin))]
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Redirect {
    match state.api().deactivate_product(id).await {
        Ok(message) => notify(
            &state,
            Screen::AdminProducts,
            StatusMessage::success(message.unwrap_or_else(|| "Product deactivated".to_string())),
            PRODUCTS,
        ),
        Err(e) => report_failure(&state, state.admin(), Screen::AdminProducts, &e, PRODUCTS).await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("29,90").unwrap(), Decimal::new(2990, 2));
        assert_eq!(parse_price(" 10 ").unwrap(), Decimal::new(10, 0));
        assert!(parse_price("-1").is_err());
        assert!(parse_price("ten").is_err());
    }

    #[test]
    fn test_form_blank_optionals_become_none() {
        let form = ProductForm {
            name: " Guide ".to_string(),
            description: Some("  ".to_string()),
            price: "5".to_string(),
            pdf_path: Some("/pdfs/guide.pdf".to_string()),
            cover_image: None,
        };
        let input = form.into_input().unwrap();
        assert_eq!(input.name, "Guide");
        assert!(input.description.is_none());
        assert_eq!(input.pdf_path.as_deref(), Some("/pdfs/guide.pdf"));
    }

    #[test]
    fn test_form_requires_name() {
        let form = ProductForm {
            name: "   ".to_string(),
            description: None,
            price: "5".to_string(),
            pdf_path: None,
            cover_image: None,
        };
        assert!(form.into_input().is_err());
    }

    #[test]
    fn test_form_action() {
        assert_eq!(ProductFormView::default().action(), "/admin/products");
        let editing = ProductFormView {
            id: Some(ProductId::new(4)),
            ..ProductFormView::default()
        };
        assert_eq!(editing.action(), "/admin/products/4");
    }
}
