//! Store adapter interface.
//!
//! The service layer talks to the database only through [`RecordStore`], so
//! a MySQL pool and the in-memory store are interchangeable. Adapters report
//! failures as opaque [`StoreError`]s and decide for themselves which of
//! those errors are duplicate-key violations.

use std::error::Error;

use async_trait::async_trait;
use roster_core::types::DbId;
use serde::Serialize;

use crate::models::record::{Record, RecordFields};

/// Error raised by a store adapter. The concrete type is adapter-specific.
pub type StoreError = Box<dyn Error + Send + Sync + 'static>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Point-in-time view of the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Open connections (idle plus checked out).
    pub size: u32,
    /// Open connections not currently checked out.
    pub idle: u32,
    /// Fixed capacity.
    pub max: u32,
}

/// Persistence operations for the `records` table.
///
/// `update` and `delete` return the number of rows matched by the id, so
/// callers can tell a missing id apart from a successful write.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Run a trivial query to confirm the store is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Create the `records` table if it does not exist.
    async fn ensure_schema(&self) -> StoreResult<()>;

    /// All records, newest (highest id) first.
    async fn list(&self) -> StoreResult<Vec<Record>>;

    /// Insert a record and return its store-assigned id.
    async fn insert(&self, fields: &RecordFields) -> StoreResult<DbId>;

    async fn update(&self, id: DbId, fields: &RecordFields) -> StoreResult<u64>;

    async fn delete(&self, id: DbId) -> StoreResult<u64>;

    /// Whether `err` is this store's uniqueness-constraint failure.
    fn is_duplicate_key_violation(&self, err: &(dyn Error + Send + Sync + 'static)) -> bool;

    /// Pool gauges, if the adapter is backed by a pool.
    fn pool_status(&self) -> Option<PoolStatus> {
        None
    }

    /// Stop handing out connections, wait for in-flight work, then close.
    async fn close(&self);
}
