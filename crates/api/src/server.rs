//! Process lifecycle: bootstrap, bind, serve, drain.

use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use roster_db::{BootstrapError, RecordStore};
use tokio::net::TcpListener;

use crate::app::build_app;
use crate::config::{ConfigError, ServerConfig};
use crate::metrics::Metrics;
use crate::state::AppState;

/// Reasons the server stops with a failure.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("invalid HOST address '{0}'")]
    InvalidHost(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Run the service until `shutdown` resolves.
///
/// Nothing listens until the store is ready: a bootstrap failure returns
/// before the listener is bound. The store is closed on every exit path.
pub async fn run<F>(
    store: Arc<dyn RecordStore>,
    config: ServerConfig,
    metrics: Arc<Metrics>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (listener, app) = match prepare(&store, config, metrics).await {
        Ok(ready) => ready,
        Err(e) => {
            store.close().await;
            return Err(e);
        }
    };

    serve(listener, app, store, shutdown)
        .await
        .map_err(ServerError::Serve)
}

async fn prepare(
    store: &Arc<dyn RecordStore>,
    config: ServerConfig,
    metrics: Arc<Metrics>,
) -> Result<(TcpListener, Router), ServerError> {
    let report = roster_db::wait_for_store(store.as_ref(), &config.bootstrap).await?;
    metrics.set_bootstrap_attempts(report.attempts);
    tracing::info!(attempts = report.attempts, "Database ready");

    let ip: IpAddr = config
        .host
        .parse()
        .map_err(|_| ServerError::InvalidHost(config.host.clone()))?;
    let addr = SocketAddr::new(ip, config.port);
    let app_env = config.app_env.clone();

    let app = build_app(AppState::new(Arc::clone(store), config, metrics))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener.local_addr().unwrap_or(addr);
    tracing::info!(addr = %local, %app_env, "Server listening");

    Ok((listener, app))
}

/// Serve `app` until `shutdown` resolves, then drain the store.
///
/// Once `shutdown` fires no new connections are accepted; requests already
/// in flight run to completion before the store is closed.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    store: Arc<dyn RecordStore>,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    tracing::info!("Server stopped accepting connections, closing database pool");
    store.close().await;
    tracing::info!("Database pool closed");

    served
}
