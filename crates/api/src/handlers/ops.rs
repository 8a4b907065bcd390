//! Operational endpoints: metrics, synthetic latency endpoint and the catch-all 404.

use std::time::Duration;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::metrics;
use crate::state::AppState;

/// GET /metrics
///
/// Never touches the store; pool gauges come from the pool's own counters.
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.metrics.render(state.store.pool_status());
    ([(CONTENT_TYPE, metrics::CONTENT_TYPE)], body)
}

/// GET /api/heavy
///
/// Sleeps for the configured delay, for latency and timeout testing.
pub async fn heavy_task(State(state): State<AppState>) -> impl IntoResponse {
    let delay = state.config.heavy_task_delay_ms;
    tokio::time::sleep(Duration::from_millis(delay)).await;
    Json(json!({ "message": format!("Heavy task finished in {delay}ms") }))
}

/// Fallback for any request that matched no route.
pub async fn not_found(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> impl IntoResponse {
    tracing::warn!(%method, %uri, "Route not found");
    state.metrics.increment_not_found_routes();
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "code": "NOT_FOUND",
        })),
    )
}
