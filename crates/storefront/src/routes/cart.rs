//! Cart route handlers.
//!
//! The cart lives in the local [`CartStore`](crate::cart::CartStore); only
//! the purchase goes to the store API, which re-checks price and
//! availability.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use folio_core::ProductId;

use super::{Layout, money, notify, report_failure};
use crate::cart::CartLineItem;
use crate::guards::{OptionalCustomer, RequireCustomer, login_redirect, safe_next};
use crate::notices::{Screen, StatusMessage};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub cover_image: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
}

impl CartView {
    fn new(state: &AppState, items: &[CartLineItem], item_count: u64) -> Self {
        let total = items.iter().map(CartLineItem::line_total).sum();
        Self {
            items: items
                .iter()
                .map(|item| CartItemView {
                    product_id: item.product_id,
                    name: item.name.clone(),
                    cover_image: item.cover_image.clone(),
                    quantity: item.quantity,
                    price: money(state, item.unit_price),
                    line_price: money(state, item.line_total()),
                })
                .collect(),
            total: money(state, total),
            item_count,
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub next: Option<String>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Form data naming one cart line.
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Display cart page.
#[instrument(skip(state, _customer))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(_customer): RequireCustomer,
) -> impl IntoResponse {
    let cart = {
        let store = state.cart().lock().await;
        CartView::new(&state, store.items(), store.item_count())
    };

    CartShowTemplate {
        layout: Layout::load(&state, Screen::Cart).await,
        cart,
    }
}

/// Add one unit of a product.
///
/// The product is fetched from the API so the cart records the current name
/// and price. Anonymous visitors are sent to log in first.
#[instrument(skip(state, customer, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    OptionalCustomer(customer): OptionalCustomer,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let back = safe_next(form.next.as_deref(), "/");
    if customer.is_none() {
        let product_page = format!("/products/{}", form.product_id);
        return Redirect::to(&login_redirect("/login", &product_page)).into_response();
    }

    match state.api().get_product(form.product_id).await {
        Ok(product) if product.active => {
            state.cart().lock().await.add(&product);
            notify(
                &state,
                Screen::Catalog,
                StatusMessage::success(format!("{} added to cart", product.name)),
                &back,
            )
            .into_response()
        }
        Ok(_) => notify(
            &state,
            Screen::Catalog,
            StatusMessage::error("This product is no longer available"),
            &back,
        )
        .into_response(),
        Err(e) => notify(
            &state,
            Screen::Catalog,
            StatusMessage::error(e.user_message()),
            &back,
        )
        .into_response(),
    }
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(state, _customer))]
pub async fn update(
    State(state): State<AppState>,
    RequireCustomer(_customer): RequireCustomer,
    Form(form): Form<UpdateCartForm>,
) -> Redirect {
    state
        .cart()
        .lock()
        .await
        .set_quantity(form.product_id, form.quantity);
    Redirect::to("/cart")
}

/// Remove a line.
#[instrument(skip(state, _customer))]
pub async fn remove(
    State(state): State<AppState>,
    RequireCustomer(_customer): RequireCustomer,
    Form(form): Form<CartLineForm>,
) -> Redirect {
    state.cart().lock().await.remove(form.product_id);
    notify(
        &state,
        Screen::Cart,
        StatusMessage::success("Item removed from cart"),
        "/cart",
    )
}

/// Empty the cart.
#[instrument(skip(state, _customer))]
pub async fn clear(
    State(state): State<AppState>,
    RequireCustomer(_customer): RequireCustomer,
) -> Redirect {
    state.cart().lock().await.clear();
    notify(
        &state,
        Screen::Cart,
        StatusMessage::success("Cart cleared"),
        "/cart",
    )
}

/// Buy one product from the cart.
///
/// On success the line leaves the cart and the banner says whether the PDF
/// was emailed.
#[instrument(skip(state, _customer))]
pub async fn purchase(
    State(state): State<AppState>,
    RequireCustomer(_customer): RequireCustomer,
    Form(form): Form<CartLineForm>,
) -> Redirect {
    match state.api().purchase(form.product_id).await {
        Ok(receipt) => {
            state.cart().lock().await.remove(form.product_id);

            let details = if receipt.email_sent {
                "The PDF was sent to your email.".to_string()
            } else {
                let reason = receipt
                    .email_message
                    .unwrap_or_else(|| "unknown error".to_string());
                format!(
                    "The PDF could not be emailed ({reason}). You can resend it from your profile."
                )
            };
            tracing::info!(
                email_sent = receipt.email_sent,
                sale_id = ?receipt.sale.as_ref().map(|s| s.id),
                "Purchase completed"
            );
            notify(
                &state,
                Screen::Cart,
                StatusMessage::success("Purchase completed").with_details(details),
                "/cart",
            )
        }
        Err(e) => report_failure(&state, state.customer(), Screen::Cart, &e, "/cart").await,
    }
}
