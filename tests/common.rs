/// Common test utilities for flashsync integration tests
///
/// Test application setup over a private in-memory database, and a helper for
/// sending JSON requests to it.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use flashsync::{create_app, db::open_server_pool};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Creates a test application with an in-memory SQLite database
///
/// The database URI is unique per call and uses a shared cache, so every
/// pooled connection sees the same database while tests stay isolated.
pub fn create_test_app() -> Router {
    let database_url = format!("file:server_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = open_server_pool(&database_url).expect("Failed to open test database");
    create_app(Arc::new(pool))
}

/// Sends a request with an optional JSON body
///
/// ### Returns
///
/// The response status and its body parsed as JSON (`Value::Null` when empty,
/// `Value::String` when the body is not JSON)
pub async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(json) => {
            request = request.header("Content-Type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}
