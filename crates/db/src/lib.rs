//! Record storage: the pool, the store adapters and startup sequencing.

use std::fmt;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

pub mod bootstrap;
pub mod memory;
pub mod models;
pub mod mysql;
pub mod schema;
pub mod store;

pub use bootstrap::{wait_for_store, BootstrapError, BootstrapPolicy, BootstrapReport};
pub use memory::MemoryRecordStore;
pub use mysql::MySqlRecordStore;
pub use store::{PoolStatus, RecordStore, StoreError, StoreResult};

pub type DbPool = sqlx::MySqlPool;

/// Acquire deadline handed to sqlx. Callers queue for a free connection
/// until one is returned; one year stays inside tokio's timer range.
pub const UNBOUNDED_ACQUIRE_WAIT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Connection settings for the MySQL pool.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    /// Fixed pool capacity.
    pub pool_size: u32,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

impl DbConfig {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);
        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

/// Create a fixed-size connection pool without connecting.
///
/// Connections are opened on first use, so this never fails even when the
/// database is down; [`wait_for_store`] is what establishes reachability.
/// Idle connections are kept open indefinitely and a full pool never
/// rejects a caller, it only makes it wait.
pub fn create_pool(config: &DbConfig) -> DbPool {
    MySqlPoolOptions::new()
        .max_connections(config.pool_size)
        .min_connections(0)
        .acquire_timeout(UNBOUNDED_ACQUIRE_WAIT)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_lazy_with(config.connect_options())
}
