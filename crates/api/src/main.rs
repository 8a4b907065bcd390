use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster_api::config::ServerConfig;
use roster_api::metrics::Metrics;
use roster_api::server;
use roster_db::{MySqlRecordStore, RecordStore};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // --- Tracing ---
    init_tracing(&config);
    tracing::info!(
        host = %config.host,
        port = config.port,
        app_env = %config.app_env,
        db_host = %config.database.host,
        db_port = config.database.port,
        db_name = %config.database.database,
        pool_size = config.database.pool_size,
        "Loaded server configuration",
    );
    if config.database.password.is_none() {
        tracing::warn!("DB_PASSWORD is not set; connections will likely be refused");
    }

    // --- Database ---
    let pool = roster_db::create_pool(&config.database);
    let store: Arc<dyn RecordStore> = Arc::new(MySqlRecordStore::new(pool));
    tracing::info!("Database connection pool created");

    let metrics = Arc::new(Metrics::new());

    // --- Bootstrap, serve, drain ---
    match server::run(store, config, metrics, shutdown_signal()).await {
        Ok(()) => {
            tracing::info!("Graceful shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server exited with an error");
            ExitCode::FAILURE
        }
    }
}

/// Install the global subscriber. Production emits JSON lines.
fn init_tracing(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "roster_api=debug,roster_db=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// drains in-flight requests whether stopped interactively or by a
/// container runtime.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
