//! The full storefront router against the stub store API.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use folio_integration_tests::{ADMIN_USERNAME, CUSTOMER_EMAIL, PASSWORD, StubApi};
use folio_storefront::state::AppState;
use folio_storefront::storage::MemoryStorage;
use tower::ServiceExt;

struct Harness {
    stub: StubApi,
    state: AppState,
    app: Router,
}

impl Harness {
    /// Storefront over a fresh stub, with the startup probes finished.
    async fn start() -> Self {
        let harness = Self::start_loading().await;
        harness
            .state
            .start_session_probes()
            .await
            .expect("probe task");
        harness
    }

    /// Storefront whose startup probes have not run yet.
    async fn start_loading() -> Self {
        let stub = StubApi::start().await;
        let state = AppState::with_storage(stub.config(), Arc::new(MemoryStorage::new()))
            .expect("app state");
        let app = folio_storefront::app(state.clone());
        Self { stub, state, app }
    }

    async fn get(&self, uri: &str) -> Response {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        self.app.clone().oneshot(request).await.expect("response")
    }

    async fn post(&self, uri: &str, form: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("request");
        self.app.clone().oneshot(request).await.expect("response")
    }

    async fn sign_in_customer(&self) {
        let response = self
            .post("/login", &format!("email={CUSTOMER_EMAIL}&password={PASSWORD}"))
            .await;
        assert_eq!(location(&response), "/");
    }

    async fn sign_in_admin(&self) {
        let response = self
            .post(
                "/admin/login",
                &format!("username={ADMIN_USERNAME}&password={PASSWORD}"),
            )
            .await;
        assert_eq!(location(&response), "/admin/dashboard");
    }
}

fn location(response: &Response) -> &str {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("location header")
}

async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

#[tokio::test]
async fn test_health() {
    let harness = Harness::start().await;
    let response = harness.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "ok");
}

#[tokio::test]
async fn test_catalog_lists_active_products_with_branding() {
    let harness = Harness::start().await;

    let response = harness.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;

    assert!(body.contains("Loja Teste"));
    assert!(body.contains("Rust Guide"));
    assert!(!body.contains("Old Edition"));
    assert!(body.contains("Log in to buy"));
}

#[tokio::test]
async fn test_inactive_product_detail_is_not_found() {
    let harness = Harness::start().await;
    assert_eq!(harness.get("/products/2").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(harness.get("/products/1").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_add_to_cart_goes_to_login() {
    let harness = Harness::start().await;

    let response = harness.post("/cart/add", "product_id=1").await;

    assert_eq!(location(&response), "/login?next=%2Fproducts%2F1");
    assert!(harness.state.cart().lock().await.is_empty());
}

#[tokio::test]
async fn test_guard_shows_loading_page_while_probe_pending() {
    let harness = Harness::start_loading().await;

    let response = harness.get("/cart").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains("content=\"1;url=/cart\""));

    let admin = text(harness.get("/admin/sales?page=2").await).await;
    assert!(admin.contains("content=\"1;url=/admin/sales?page=2\""));
}

#[tokio::test]
async fn test_guard_redirects_anonymous_visitors() {
    let harness = Harness::start().await;

    let cart = harness.get("/cart").await;
    assert_eq!(location(&cart), "/login?next=%2Fcart");

    let dashboard = harness.get("/admin/dashboard").await;
    assert_eq!(location(&dashboard), "/admin/login?next=%2Fadmin%2Fdashboard");
}

#[tokio::test]
async fn test_login_returns_to_next_with_notice() {
    let harness = Harness::start().await;

    let response = harness
        .post(
            "/login",
            &format!("email={CUSTOMER_EMAIL}&password={PASSWORD}&next=%2Fcart"),
        )
        .await;
    assert_eq!(location(&response), "/cart");

    let page = text(harness.get("/cart").await).await;
    assert!(page.contains("Login realizado com sucesso"));
}

#[tokio::test]
async fn test_admin_login_returns_to_next_with_notice() {
    let harness = Harness::start().await;

    let response = harness
        .post(
            "/admin/login",
            &format!("username={ADMIN_USERNAME}&password={PASSWORD}&next=%2Fadmin%2Fsettings"),
        )
        .await;
    assert_eq!(location(&response), "/admin/settings");

    let page = text(harness.get("/admin/settings").await).await;
    assert!(page.contains("Login realizado com sucesso"));
}

#[tokio::test]
async fn test_failed_login_shows_server_message() {
    let harness = Harness::start().await;

    let response = harness
        .post("/login", &format!("email={CUSTOMER_EMAIL}&password=wrong"))
        .await;
    assert!(location(&response).starts_with("/login"));

    let page = text(harness.get("/login").await).await;
    assert!(page.contains("Email ou senha incorretos"));
}

#[tokio::test]
async fn test_cart_and_purchase_flow() {
    let harness = Harness::start().await;
    harness.sign_in_customer().await;

    let added = harness.post("/cart/add", "product_id=1&next=/").await;
    assert_eq!(location(&added), "/");
    let again = harness.post("/cart/add", "product_id=1&next=/").await;
    assert_eq!(location(&again), "/");

    {
        let cart = harness.state.cart().lock().await;
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    let page = text(harness.get("/cart").await).await;
    assert!(page.contains("Rust Guide"));

    let purchased = harness.post("/cart/purchase", "product_id=1").await;
    assert_eq!(location(&purchased), "/cart");
    assert!(harness.stub.saw("POST /api/vendas/comprar"));
    assert!(harness.state.cart().lock().await.is_empty());

    let page = text(harness.get("/cart").await).await;
    assert!(page.contains("Purchase completed"));
    assert!(page.contains("The PDF was sent to your email."));
}

#[tokio::test]
async fn test_cart_quantity_zero_removes_line() {
    let harness = Harness::start().await;
    harness.sign_in_customer().await;
    let _ = harness.post("/cart/add", "product_id=1").await;

    let response = harness.post("/cart/update", "product_id=1&quantity=0").await;

    assert_eq!(location(&response), "/cart");
    assert!(harness.state.cart().lock().await.is_empty());
}

#[tokio::test]
async fn test_admin_dashboard_after_login() {
    let harness = Harness::start().await;
    harness.sign_in_admin().await;

    let response = harness.get("/admin/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains("Rust Guide (3)"));
    assert!(body.contains(ADMIN_USERNAME));
}

#[tokio::test]
async fn test_blank_test_email_is_rejected_locally() {
    let harness = Harness::start().await;
    harness.sign_in_admin().await;

    let response = harness.post("/admin/settings/test-email", "email=++").await;

    assert_eq!(location(&response), "/admin/settings");
    assert!(!harness.stub.saw("POST /api/admin/testar-email"));

    let page = text(harness.get("/admin/settings").await).await;
    assert!(page.contains("Enter an email address for the test"));
}

#[tokio::test]
async fn test_admin_bootstrap_posts_notice() {
    let harness = Harness::start().await;

    let response = harness
        .post("/admin/bootstrap", "username=owner&password=secret")
        .await;
    assert_eq!(location(&response), "/admin/login");

    let page = text(harness.get("/admin/login").await).await;
    assert!(page.contains("Administrador criado com sucesso"));
    assert!(harness.state.admin().identity().await.is_none());
}
