//! Integration tests for Folio.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p folio-integration-tests
//! ```
//!
//! The tests never touch a real store API. [`StubApi`] serves a small,
//! fixed store on an ephemeral localhost port, speaking the same JSON and
//! session cookies as the real backend, and records every request it sees.
//!
//! # Fixtures
//!
//! - Customer `ana@example.com` / `secret`
//! - Administrator `root` / `secret`
//! - Product 1 "Rust Guide" (active), product 2 "Old Edition" (inactive)

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use folio_storefront::config::StorefrontConfig;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

pub const CUSTOMER_EMAIL: &str = "ana@example.com";
pub const ADMIN_USERNAME: &str = "root";
pub const PASSWORD: &str = "secret";
pub const BAD_CREDENTIALS: &str = "Email ou senha incorretos";
pub const ADMIN_EXISTS: &str = "Ja existe um administrador cadastrado";

const CUSTOMER_COOKIE: &str = "folio_customer=ana";
const ADMIN_COOKIE: &str = "folio_admin=root";

#[derive(Default)]
struct StubState {
    requests: Mutex<Vec<String>>,
    admin_created: AtomicBool,
    fail_logout: AtomicBool,
    garble_logins: AtomicBool,
}

/// An in-process store API.
pub struct StubApi {
    addr: SocketAddr,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubApi {
    /// Bind on an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub address");

        let app = router(state.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// The API base URL, with trailing slash.
    ///
    /// # Panics
    ///
    /// Panics if the address does not form a URL.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/", self.addr)).expect("stub url")
    }

    /// Storefront configuration pointing at this stub.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let base = self.base_url().to_string();
        StorefrontConfig::from_lookup(|key| match key {
            "FOLIO_API_BASE_URL" => Some(base.clone()),
            "FOLIO_REQUEST_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .expect("stub config")
    }

    /// Every request seen so far, as `"METHOD /path"`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a request matching `"METHOD /path"` was seen.
    #[must_use]
    pub fn saw(&self, request: &str) -> bool {
        self.requests().iter().any(|r| r == request)
    }

    /// Make both logout endpoints answer 500.
    pub fn fail_logout(&self) {
        self.state.fail_logout.store(true, Ordering::SeqCst);
    }

    /// Make both login endpoints answer 500 with an HTML body.
    pub fn garble_logins(&self) {
        self.state.garble_logins.store(true, Ordering::SeqCst);
    }
}

impl Drop for StubApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(state: Arc<StubState>) -> Router {
    let api = Router::new()
        .route("/clientes/status", get(customer_status))
        .route("/clientes/login", post(customer_login))
        .route("/clientes/logout", post(logout))
        .route("/admin/status", get(admin_status))
        .route("/admin/login", post(admin_login))
        .route("/admin/logout", post(logout))
        .route("/admin/criar-admin", post(create_admin))
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/configuracao", get(settings))
        .route("/admin/configuracao", put(settings))
        .route("/admin/testar-email", post(test_email))
        .route("/configuracao-publica", get(branding))
        .route("/produtos", get(products))
        .route("/produtos/{id}", get(product))
        .route("/vendas/comprar", post(purchase))
        .route("/vendas/minhas-compras", get(my_purchases));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Arc<StubState>>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(line);
    next.run(request).await
}

fn has_cookie(headers: &HeaderMap, cookie: &str) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(';').any(|c| c.trim() == cookie))
}

fn with_cookie(status: StatusCode, body: Value, cookie: &str) -> Response {
    let mut response = (status, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(&format!("{cookie}; Path=/; HttpOnly")) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "erro": message }))).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "Login necessario")
}

fn customer_json() -> Value {
    json!({
        "id": 7,
        "nome": "Ana",
        "email": CUSTOMER_EMAIL,
        "ativo": true,
        "data_cadastro": "2024-05-01T10:00:00"
    })
}

fn admin_json() -> Value {
    json!({ "id": 1, "usuario": ADMIN_USERNAME, "ativo": true })
}

fn product_json(id: i64) -> Option<Value> {
    match id {
        1 => Some(json!({
            "id": 1,
            "nome": "Rust Guide",
            "descricao": "A practical guide",
            "preco": 29.9,
            "caminho_pdf": "/pdfs/rust-guide.pdf",
            "ativo": true
        })),
        2 => Some(json!({
            "id": 2,
            "nome": "Old Edition",
            "preco": 9.9,
            "ativo": false
        })),
        _ => None,
    }
}

fn sale_json() -> Value {
    json!({
        "id": 100,
        "id_cliente": 7,
        "id_produto": 1,
        "preco_total": 29.9,
        "status": "concluida",
        "email_enviado": true,
        "produto_nome": "Rust Guide"
    })
}

async fn customer_status(headers: HeaderMap) -> Json<Value> {
    if has_cookie(&headers, CUSTOMER_COOKIE) {
        Json(json!({ "logado": true, "cliente": customer_json() }))
    } else {
        Json(json!({ "logado": false }))
    }
}

async fn customer_login(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> Response {
    if state.garble_logins.load(Ordering::SeqCst) {
        return garbled();
    }
    if body["email"] == CUSTOMER_EMAIL && body["senha"] == PASSWORD {
        with_cookie(
            StatusCode::OK,
            json!({ "mensagem": "Login realizado com sucesso", "cliente": customer_json() }),
            CUSTOMER_COOKIE,
        )
    } else {
        error(StatusCode::UNAUTHORIZED, BAD_CREDENTIALS)
    }
}

async fn admin_status(headers: HeaderMap) -> Json<Value> {
    if has_cookie(&headers, ADMIN_COOKIE) {
        Json(json!({ "logado": true, "admin": admin_json() }))
    } else {
        Json(json!({ "logado": false }))
    }
}

async fn admin_login(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> Response {
    if state.garble_logins.load(Ordering::SeqCst) {
        return garbled();
    }
    if body["usuario"] == ADMIN_USERNAME && body["senha"] == PASSWORD {
        with_cookie(
            StatusCode::OK,
            json!({ "mensagem": "Login realizado com sucesso", "admin": admin_json() }),
            ADMIN_COOKIE,
        )
    } else {
        error(StatusCode::UNAUTHORIZED, "Usuario ou senha incorretos")
    }
}

fn garbled() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/html")],
        "<html>oops</html>",
    )
        .into_response()
}

async fn logout(State(state): State<Arc<StubState>>) -> Response {
    if state.fail_logout.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Falha no logout");
    }
    Json(json!({ "mensagem": "Logout realizado com sucesso" })).into_response()
}

async fn create_admin(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    if state.admin_created.swap(true, Ordering::SeqCst) {
        return error(StatusCode::BAD_REQUEST, ADMIN_EXISTS);
    }
    let admin = json!({ "id": 1, "usuario": body["usuario"], "ativo": true });
    (
        StatusCode::CREATED,
        Json(json!({ "mensagem": "Administrador criado com sucesso", "admin": admin })),
    )
        .into_response()
}

async fn dashboard(headers: HeaderMap) -> Response {
    if !has_cookie(&headers, ADMIN_COOKIE) {
        return unauthorized();
    }
    Json(json!({
        "total_produtos": 1,
        "total_clientes": 1,
        "total_vendas": 3,
        "receita_total": 89.7,
        "vendas_recentes": 2,
        "produtos_mais_vendidos": [{ "nome": "Rust Guide", "total_vendas": 3 }]
    }))
    .into_response()
}

async fn settings(headers: HeaderMap) -> Response {
    if !has_cookie(&headers, ADMIN_COOKIE) {
        return unauthorized();
    }
    Json(json!({ "nome_loja": "Loja Teste", "email_smtp_port": 587 })).into_response()
}

async fn test_email(headers: HeaderMap) -> Response {
    if !has_cookie(&headers, ADMIN_COOKIE) {
        return unauthorized();
    }
    Json(json!({ "mensagem": "Email de teste enviado" })).into_response()
}

async fn branding() -> Json<Value> {
    Json(json!({ "nome_loja": "Loja Teste", "cor_primaria": "#112233", "cor_secundaria": "#445566" }))
}

async fn products() -> Json<Value> {
    Json(Value::Array([1, 2].into_iter().filter_map(product_json).collect()))
}

async fn product(Path(id): Path<i64>) -> Response {
    product_json(id).map_or_else(
        || error(StatusCode::NOT_FOUND, "Produto nao encontrado"),
        |p| Json(p).into_response(),
    )
}

async fn purchase(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !has_cookie(&headers, CUSTOMER_COOKIE) {
        return unauthorized();
    }
    if body["produto_id"] != 1 {
        return error(StatusCode::BAD_REQUEST, "Produto indisponivel");
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "mensagem": "Compra realizada com sucesso",
            "venda": sale_json(),
            "email_enviado": true,
            "mensagem_email": "Email enviado"
        })),
    )
        .into_response()
}

async fn my_purchases(headers: HeaderMap) -> Response {
    if !has_cookie(&headers, CUSTOMER_COOKIE) {
        return unauthorized();
    }
    Json(json!([sale_json()])).into_response()
}
