pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /records                                         list, create
/// /records/{id}                                    update (PUT), delete
/// /heavy                                           synthetic latency endpoint
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/records",
            get(handlers::records::list_records).post(handlers::records::create_record),
        )
        .route(
            "/records/{id}",
            axum::routing::put(handlers::records::update_record)
                .delete(handlers::records::delete_record),
        )
        .route("/heavy", get(handlers::ops::heavy_task))
}

/// Root-level operational routes.
pub fn ops_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(handlers::ops::render_metrics))
}
