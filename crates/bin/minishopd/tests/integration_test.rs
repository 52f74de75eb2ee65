//! End-to-end tests for the full minishopd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real repos,
//! real services, real axum router, in-memory sessions) and exercises the
//! HTTP layer via `tower::ServiceExt::oneshot`. No TCP port is bound.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use tower_sessions::cookie::time::Duration;

use minishop_adapter_http_axum::state::AppState;
use minishop_adapter_http_axum::{router, session};
use minishop_adapter_storage_sqlite_sqlx::{
    Config, SqliteCustomerRepository, SqliteOrderRepository, SqliteProductRepository,
    SqliteUserRepository,
};
use minishop_app::ports::Mailer;
use minishop_app::services::auth_service::AuthService;
use minishop_app::services::customer_service::CustomerService;
use minishop_app::services::order_service::OrderService;
use minishop_app::services::product_service::ProductService;
use minishop_domain::error::MiniShopError;

/// Mailer that keeps every `(email, code)` pair it was asked to send.
#[derive(Clone, Default)]
struct CapturingMailer {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl CapturingMailer {
    fn last_code_for(&self, email: &str) -> String {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
            .expect("a code should have been sent")
    }

    fn record(&self, email: &str, code: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
    }
}

impl Mailer for CapturingMailer {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<(), MiniShopError> {
        self.record(email, code);
        Ok(())
    }

    async fn send_recovery_code(&self, email: &str, code: &str) -> Result<(), MiniShopError> {
        self.record(email, code);
        Ok(())
    }
}

/// A fully-wired router plus a cookie jar holding one session.
struct TestApp {
    router: Router,
    mailer: CapturingMailer,
    cookie: Option<String>,
}

impl TestApp {
    async fn new() -> Self {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .expect("in-memory database should initialise");
        let pool = db.pool().clone();

        let customer_repo = SqliteCustomerRepository::new(pool.clone());
        let product_repo = SqliteProductRepository::new(pool.clone());
        let order_repo = SqliteOrderRepository::new(pool.clone());
        let user_repo = SqliteUserRepository::new(pool);
        let mailer = CapturingMailer::default();

        let state = AppState::new(
            CustomerService::new(customer_repo.clone()),
            ProductService::new(product_repo.clone()),
            OrderService::new(order_repo, customer_repo, product_repo),
            AuthService::new(user_repo, mailer.clone()),
        );
        let sessions = session::layer(MemoryStore::default(), false, Duration::hours(1));

        Self {
            router: router::build(state, sessions),
            mailer,
            cookie: None,
        }
    }

    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Response<Body> {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    async fn json(&mut self, method: &str, uri: &str, body: Value) -> Response<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        self.send(builder, Body::from(body.to_string())).await
    }

    async fn form(&mut self, uri: &str, body: &str) -> Response<Body> {
        let builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(builder, Body::from(body.to_string())).await
    }

    async fn delete(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().method("DELETE").uri(uri), Body::empty())
            .await
    }

    /// Register, verify and log in an account.
    async fn logged_in() -> Self {
        let mut app = Self::new().await;
        let response = app.json("POST", "/api/auth/register", registration()).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let code = app.mailer.last_code_for("grace@example.com");
        let response = app
            .json(
                "POST",
                "/api/auth/verify",
                json!({ "email": "grace@example.com", "code": code }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.json("POST", "/api/auth/login", credentials()).await;
        assert_eq!(response.status(), StatusCode::OK);
        app
    }
}

fn registration() -> Value {
    json!({
        "first_name": "Grace",
        "last_name": "Hopper",
        "email": "grace@example.com",
        "username": "grace",
        "password": "cobol-forever",
    })
}

fn credentials() -> Value {
    json!({ "login": "grace", "password": "cobol-forever" })
}

fn laptop(stock: u32) -> Value {
    json!({
        "brand": "Lenovo",
        "model": "ThinkPad X1",
        "display_size": 14.0,
        "weight": 1120,
        "operating_system": "Linux",
        "price": "1499.90",
        "stock_number": stock,
        "kind": {
            "type": "laptop",
            "network_interface": "Wi-Fi 6E",
            "hard_drive": "1TB SSD",
            "ports": "2x USB-C",
        },
    })
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let mut app = TestApp::new().await;

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_refuse_login_until_email_is_verified() {
    let mut app = TestApp::new().await;
    app.json("POST", "/api/auth/register", registration()).await;

    let response = app.json("POST", "/api/auth/login", credentials()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let code = app.mailer.last_code_for("grace@example.com");
    let response = app
        .json(
            "POST",
            "/api/auth/verify",
            json!({ "email": "grace@example.com", "code": code }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.json("POST", "/api/auth/login", credentials()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "grace");

    let response = app.get("/api/auth/me").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_reject_duplicate_username() {
    let mut app = TestApp::new().await;
    app.json("POST", "/api/auth/register", registration()).await;

    let response = app.json("POST", "/api/auth/register", registration()).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn should_reset_password_with_recovery_code() {
    let mut app = TestApp::logged_in().await;
    app.json("POST", "/api/auth/logout", json!({})).await;

    let response = app
        .json("POST", "/api/auth/recover", json!({ "email": "grace@example.com" }))
        .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let code = app.mailer.last_code_for("grace@example.com");
    let response = app
        .json(
            "POST",
            "/api/auth/reset",
            json!({ "email": "grace@example.com", "code": code, "password": "new-password" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.json("POST", "/api/auth/login", credentials()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .json(
            "POST",
            "/api/auth/login",
            json!({ "login": "grace@example.com", "password": "new-password" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Catalog and orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_track_stock_through_orders() {
    let mut app = TestApp::logged_in().await;

    let response = app
        .json("POST", "/api/customers", json!({ "name": "Ada Lovelace" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let customer_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app.json("POST", "/api/products", laptop(2)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let product_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .json(
            "POST",
            "/api/orders",
            json!({ "customer_id": customer_id, "product_id": product_id, "quantity": 1 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = body_json(response).await;
    assert_eq!(order["total_price"], "1499.90");

    let response = app
        .json(
            "POST",
            "/api/orders",
            json!({ "customer_id": customer_id, "product_id": product_id, "quantity": 5 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.get(&format!("/api/products/{product_id}")).await;
    assert_eq!(body_json(response).await["stock_number"], 1);

    let response = app.get("/api/laptops?q=thinkpad").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = app.get("/api/phones").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);

    let response = app.delete(&format!("/api/products/{product_id}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.delete(&format!("/api/customers/{customer_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.get("/api/orders").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);

    let response = app.delete(&format!("/api/products/{product_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn should_keep_stock_and_category_when_product_is_edited() {
    let mut app = TestApp::logged_in().await;
    let response = app.json("POST", "/api/products", laptop(4)).await;
    let product_id = body_json(response).await["id"].as_str().unwrap().to_string();
    let uri = format!("/api/products/{product_id}");

    let mut edited = laptop(40);
    edited["description"] = json!("Refurbished");
    let response = app.json("PUT", &uri, edited).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["description"], "Refurbished");
    assert_eq!(body["stock_number"], 4);

    let mut as_phone = laptop(4);
    as_phone["kind"] = json!({
        "type": "phone",
        "sim_type": "eSIM",
        "cellular_connectivity": "5G",
        "location_features": "GPS",
    });
    let response = app.json("PUT", &uri, as_phone).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get(&uri).await;
    assert_eq!(body_json(response).await["kind"]["type"], "laptop");
}

#[tokio::test]
async fn should_reject_customer_without_name() {
    let mut app = TestApp::logged_in().await;

    let response = app
        .json("POST", "/api/customers", json!({ "name": "  " }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Back-office pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_render_dashboard_when_logged_in() {
    let mut app = TestApp::logged_in().await;

    let response = app.get("/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Dashboard"));

    let response = app.get("/login").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn should_create_customer_from_form_and_flash_result() {
    let mut app = TestApp::logged_in().await;

    let response = app
        .form(
            "/customers",
            "name=Alan+Turing&address=Bletchley&phone_number=&email=alan%40example.com",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response).to_string();

    let response = app.get(&target).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Alan Turing"));
}

#[tokio::test]
async fn should_log_in_through_login_form() {
    let mut app = TestApp::new().await;
    app.json("POST", "/api/auth/register", registration()).await;
    let code = app.mailer.last_code_for("grace@example.com");
    app.json(
        "POST",
        "/api/auth/verify",
        json!({ "email": "grace@example.com", "code": code }),
    )
    .await;

    let response = app
        .form("/login", "login=grace&password=cobol-forever")
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn should_redirect_to_login_after_logout() {
    let mut app = TestApp::logged_in().await;

    let response = app.form("/logout", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = app.get("/dashboard").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}
