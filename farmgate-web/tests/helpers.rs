//! Integration test helpers
//!
//! Builds the full router over an in-memory database with a manual clock and
//! drives it in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use farmgate_web::{
    clock::ManualClock,
    create_app,
    models::{NewProduct, Product},
    AppState, WebConfig,
};
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const PASSWORD: &str = "harvest-2024";

// Tracing is initialised once per test binary
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

pub fn test_config() -> WebConfig {
    WebConfig {
        port: 0,
        dev_mode: true,
        database_url: "sqlite::memory:".to_string(),
        ..WebConfig::default()
    }
}

/// In-process application with direct access to its state and clock
pub struct TestApp {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        LazyLock::force(&TRACING);

        let clock = Arc::new(ManualClock::default());
        let state = AppState::with_clock(test_config(), clock.clone())
            .await
            .unwrap();
        let router = create_app(state.clone());

        Self {
            state,
            clock,
            router,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.send(create_request("GET", uri, None, cookie)).await
    }

    pub async fn post(&self, uri: &str, body: Value, cookie: Option<&str>) -> Response {
        self.send(create_request("POST", uri, Some(body), cookie))
            .await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.send(create_request("DELETE", uri, None, cookie)).await
    }

    /// Register an admin and return its session cookie value
    pub async fn admin_session(&self, email: &str) -> String {
        let response = self
            .post(
                "/register",
                json!({
                    "email": email,
                    "password": PASSWORD,
                    "confirm_password": PASSWORD,
                }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        self.login("/login", email).await
    }

    /// Register a farmer without approving it; returns the farmer id
    pub async fn register_farmer(&self, email: &str) -> i64 {
        let response = self
            .post(
                "/farmer/register",
                json!({
                    "email": email,
                    "password": PASSWORD,
                    "first_name": "Wanjiru",
                    "last_name": "Kamau",
                    "farm_name": "Sunrise Farm",
                    "farm_size": "5 acres",
                    "location": "Limuru",
                }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = extract_json(response).await;
        body["farmer"]["id"].as_i64().unwrap()
    }

    /// Register and approve a farmer, then log in; returns (id, cookie)
    pub async fn farmer_session(&self, email: &str) -> (i64, String) {
        let id = self.register_farmer(email).await;
        self.state.farmers.approve(id).await.unwrap().unwrap();
        let cookie = self.login("/farmer/login", email).await;
        (id, cookie)
    }

    /// Register a buyer and log in; returns (id, cookie)
    pub async fn buyer_session(&self, email: &str) -> (i64, String) {
        let response = self
            .post(
                "/buyer/register",
                json!({
                    "email": email,
                    "password": PASSWORD,
                    "first_name": "Tomas",
                    "last_name": "Reyes",
                    "delivery_address": "12 Market Lane",
                    "delivery_preferences": { "days": ["sat"] },
                }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = extract_json(response).await["buyer"]["id"]
            .as_i64()
            .unwrap();

        let cookie = self.login("/buyer/login", email).await;
        (id, cookie)
    }

    /// Log in at `path` and return the session cookie value
    pub async fn login(&self, path: &str, email: &str) -> String {
        let response = self
            .post(path, json!({ "email": email, "password": PASSWORD }), None)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response).expect("login sets the session cookie")
    }

    pub async fn seed_product(
        &self,
        farmer_id: i64,
        name: &str,
        category_id: i64,
        price: f64,
        quantity: i64,
    ) -> Product {
        self.state
            .products
            .create(
                farmer_id,
                &NewProduct {
                    name: name.to_string(),
                    category_id,
                    price,
                    quantity,
                    description: String::new(),
                    images: Vec::new(),
                },
            )
            .await
            .unwrap()
    }
}

/// Build a request, attaching JSON and the session cookie when given
pub fn create_request(
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, format!("session_id={}", cookie));
    }

    if let Some(body) = body {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        builder
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    }
}

pub async fn extract_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Raw `Set-Cookie` header for the session cookie, if any
pub fn session_set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("session_id="))
        .map(str::to_string)
}

/// Value of the session cookie set by `response`, if any
pub fn session_cookie(response: &Response) -> Option<String> {
    let header = session_set_cookie(response)?;
    let pair = header.split(';').next()?;
    let value = pair.trim_start_matches("session_id=");
    (!value.is_empty()).then(|| value.to_string())
}

/// Running server reachable over HTTP
pub struct SpawnedApp {
    pub address: String,
    pub state: AppState,
    pub api_client: reqwest::Client,
}

/// Serve the app on a random port, with a cookie-keeping client
pub async fn spawn_app() -> SpawnedApp {
    LazyLock::force(&TRACING);

    let state = AppState::new(test_config()).await.unwrap();
    let app = create_app(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();

    SpawnedApp {
        address: format!("http://127.0.0.1:{}", port),
        state,
        api_client: client,
    }
}
