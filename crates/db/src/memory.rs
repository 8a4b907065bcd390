//! In-memory [`RecordStore`] for tests and local runs without MySQL.
//!
//! Mirrors the MySQL table's observable behaviour: monotonically assigned
//! ids that are never reused, a unique email column, and matched-row counts
//! from `update`/`delete`. Availability can be toggled to simulate a store
//! that is still starting or has gone away.

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use roster_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::record::{Record, RecordFields};
use crate::store::{RecordStore, StoreResult};

/// Failures produced by [`MemoryRecordStore`].
#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("Duplicate entry '{0}' for key 'uq_records_email'")]
    DuplicateEmail(String),

    #[error("store unavailable")]
    Unavailable,

    #[error("store closed")]
    Closed,
}

#[derive(Default)]
struct Table {
    rows: BTreeMap<DbId, Record>,
    last_id: DbId,
}

#[derive(Default)]
pub struct MemoryRecordStore {
    table: RwLock<Table>,
    unavailable: AtomicBool,
    /// Remaining `ping` calls that fail before the store becomes reachable.
    pending_failures: AtomicU32,
    pings: AtomicU32,
    schema_ensured: AtomicBool,
    closed: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every call until [`set_available`](Self::set_available).
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.unavailable.store(true, Ordering::SeqCst);
        store
    }

    /// A store whose first `failures` pings fail, as if still starting up.
    pub fn failing_first(failures: u32) -> Self {
        let store = Self::default();
        store.pending_failures.store(failures, Ordering::SeqCst);
        store
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of `ping` calls received so far.
    pub fn ping_count(&self) -> u32 {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn schema_ensured(&self) -> bool {
        self.schema_ensured.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_open(&self) -> Result<(), MemoryStoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(MemoryStoreError::Closed);
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MemoryStoreError::Unavailable);
        }
        Ok(())
    }
}

fn email_taken(table: &Table, email: &str, except: Option<DbId>) -> bool {
    table
        .rows
        .values()
        .any(|r| r.email == email && Some(r.id) != except)
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn ping(&self) -> StoreResult<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        self.check_open()?;
        let consumed = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if consumed.is_ok() {
            return Err(MemoryStoreError::Unavailable.into());
        }
        Ok(())
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        self.check_open()?;
        self.schema_ensured.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Record>> {
        self.check_open()?;
        let table = self.table.read().await;
        Ok(table.rows.values().rev().cloned().collect())
    }

    async fn insert(&self, fields: &RecordFields) -> StoreResult<DbId> {
        self.check_open()?;
        let mut table = self.table.write().await;
        if email_taken(&table, &fields.email, None) {
            return Err(MemoryStoreError::DuplicateEmail(fields.email.clone()).into());
        }
        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(
            id,
            Record {
                id,
                name: fields.name.clone(),
                email: fields.email.clone(),
                role: fields.role.clone(),
                created_at: chrono::Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update(&self, id: DbId, fields: &RecordFields) -> StoreResult<u64> {
        self.check_open()?;
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Ok(0);
        }
        if email_taken(&table, &fields.email, Some(id)) {
            return Err(MemoryStoreError::DuplicateEmail(fields.email.clone()).into());
        }
        if let Some(row) = table.rows.get_mut(&id) {
            row.name = fields.name.clone();
            row.email = fields.email.clone();
            row.role = fields.role.clone();
        }
        Ok(1)
    }

    async fn delete(&self, id: DbId) -> StoreResult<u64> {
        self.check_open()?;
        let mut table = self.table.write().await;
        Ok(u64::from(table.rows.remove(&id).is_some()))
    }

    fn is_duplicate_key_violation(&self, err: &(dyn Error + Send + Sync + 'static)) -> bool {
        matches!(
            err.downcast_ref::<MemoryStoreError>(),
            Some(MemoryStoreError::DuplicateEmail(_))
        )
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
