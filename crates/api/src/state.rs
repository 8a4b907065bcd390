use std::sync::Arc;

use roster_db::RecordStore;

use crate::config::ServerConfig;
use crate::metrics::Metrics;
use crate::service::RecordService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Store adapter, shared with the record service. Used directly for health and pool gauges.
    pub store: Arc<dyn RecordStore>,
    pub records: RecordService,
    pub config: Arc<ServerConfig>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wire the record service to `store`. The composition root owns the store.
    pub fn new(store: Arc<dyn RecordStore>, config: ServerConfig, metrics: Arc<Metrics>) -> Self {
        let records = RecordService::new(Arc::clone(&store), Arc::clone(&metrics));
        Self {
            store,
            records,
            config: Arc::new(config),
            metrics,
        }
    }
}
