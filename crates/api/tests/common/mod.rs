#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use roster_api::app::build_app;
use roster_api::config::ServerConfig;
use roster_api::metrics::Metrics;
use roster_api::state::AppState;
use roster_db::MemoryRecordStore;

/// Build a test `ServerConfig` from the defaults, with a short heavy-task delay.
pub fn test_config() -> ServerConfig {
    ServerConfig::from_lookup(|var| match var {
        "HOST" => Some("127.0.0.1".to_string()),
        "PORT" => Some("0".to_string()),
        "HEAVY_TASK_DELAY_MS" => Some("10".to_string()),
        _ => None,
    })
    .expect("test config is valid")
}

/// Build the full application router over an in-memory store.
///
/// Uses the same `build_app` as `server::run`, so tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery).
pub fn build_test_app(store: Arc<MemoryRecordStore>) -> Router {
    build_test_app_with_metrics(store).0
}

/// Like [`build_test_app`], also returning the metrics registry.
pub fn build_test_app_with_metrics(store: Arc<MemoryRecordStore>) -> (Router, Arc<Metrics>) {
    build_test_app_with_config(store, test_config())
}

pub fn build_test_app_with_config(
    store: Arc<MemoryRecordStore>,
    config: ServerConfig,
) -> (Router, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new());
    let state = AppState::new(store, config, Arc::clone(&metrics));
    let app = build_app(state).expect("router builds");
    (app, metrics)
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send_raw(app, method, uri, &body.to_string()).await
}

/// Send `body` verbatim with a JSON content type.
pub async fn send_raw(app: Router, method: Method, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
