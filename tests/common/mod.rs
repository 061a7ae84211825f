#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    Router,
};
use innkeep_app::Application;
use innkeep_kernel::settings::Settings;
use serde_json::Value;
use tower::ServiceExt;

/// The full application over a private in-memory database.
pub struct TestApp {
    pub app: Application,
    router: Router,
}

pub async fn spawn() -> TestApp {
    spawn_with(|_| {}).await
}

pub async fn spawn_with(configure: impl FnOnce(&mut Settings)) -> TestApp {
    let mut settings = Settings::default();
    settings.database.url = "sqlite::memory:".to_string();
    configure(&mut settings);

    let app = Application::connect(settings).await.unwrap();
    app.migrate().await.unwrap();
    let router = app.router();
    TestApp { app, router }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body.to_string())).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body.to_string())).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body.to_string())).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Send a request with an arbitrary body. Responses that are not JSON
    /// come back as a string value, empty ones as `null`.
    pub async fn send(&self, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
        let mut request = axum::http::Request::builder().method(method).uri(uri);
        if body.is_some() {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        let request = request
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Create a room and return its id.
    pub async fn room(&self, description: &str, price: &str) -> String {
        let (status, body) = self
            .post(
                "/api/rooms",
                serde_json::json!({"description": description, "price": price}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["room_id"].as_str().unwrap().to_string()
    }

    /// Book a room and return the created booking.
    pub async fn book(&self, room: &str, check_in: &str, check_out: &str) -> (StatusCode, Value) {
        self.post(
            "/api/bookings",
            serde_json::json!({"room": room, "check_in": check_in, "check_out": check_out}),
        )
        .await
    }
}

/// Field names reported in a validation error body.
pub fn error_fields(body: &Value) -> Vec<String> {
    body["error"]["details"]
        .as_array()
        .map(|details| {
            details
                .iter()
                .filter_map(|d| d["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
