//! Record service: validation, store calls and outcome classification.
//!
//! The service sees the database only through [`RecordStore`]. Store
//! failures are reclassified here: the adapter's duplicate-key check is the
//! only path to [`CoreError::Conflict`], and everything else becomes
//! [`CoreError::Internal`], whose text never reaches a client.

use std::sync::Arc;

use roster_core::error::CoreError;
use roster_core::record::{require_text, resolve_role, RECORD_ENTITY};
use roster_core::types::DbId;
use roster_db::models::{CreateRecord, CreatedRecord, Record, RecordFields, UpdateRecord};
use roster_db::{RecordStore, StoreError};

use crate::metrics::{Metrics, Outcome, RecordOp};

/// Conflict message for a duplicate email.
pub const EMAIL_EXISTS: &str = "Email already exists";

#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    metrics: Arc<Metrics>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    /// All records, newest first. An empty table yields an empty list.
    pub async fn list_records(&self) -> Result<Vec<Record>, CoreError> {
        let result = self
            .store
            .list()
            .await
            .map_err(|e| self.classify(RecordOp::List, e));
        self.observe(RecordOp::List, result)
    }

    /// Validate and insert a record. A missing role resolves to the default.
    pub async fn create_record(&self, input: CreateRecord) -> Result<CreatedRecord, CoreError> {
        let result = self.create_inner(input).await;
        self.observe(RecordOp::Create, result)
    }

    /// Replace name, email and role of an existing record.
    pub async fn update_record(&self, id: DbId, input: UpdateRecord) -> Result<(), CoreError> {
        let result = self.update_inner(id, input).await;
        self.observe(RecordOp::Update, result)
    }

    pub async fn delete_record(&self, id: DbId) -> Result<(), CoreError> {
        let result = match self.store.delete(id).await {
            Ok(0) => Err(not_found(id)),
            Ok(_) => Ok(()),
            Err(e) => Err(self.classify(RecordOp::Delete, e)),
        };
        if result.is_ok() {
            tracing::info!(record_id = id, "Record deleted");
        }
        self.observe(RecordOp::Delete, result)
    }

    async fn create_inner(&self, input: CreateRecord) -> Result<CreatedRecord, CoreError> {
        let fields = RecordFields {
            name: require_text("name", input.name.as_deref())?.to_string(),
            email: require_text("email", input.email.as_deref())?.to_string(),
            role: resolve_role(input.role.as_deref()).to_string(),
        };

        let id = self
            .store
            .insert(&fields)
            .await
            .map_err(|e| self.classify(RecordOp::Create, e))?;

        tracing::info!(record_id = id, role = %fields.role, "Record created");
        Ok(fields.into_created(id))
    }

    async fn update_inner(&self, id: DbId, input: UpdateRecord) -> Result<(), CoreError> {
        let fields = RecordFields {
            name: require_text("name", input.name.as_deref())?.to_string(),
            email: require_text("email", input.email.as_deref())?.to_string(),
            role: require_text("role", input.role.as_deref())?.to_string(),
        };

        let affected = self
            .store
            .update(id, &fields)
            .await
            .map_err(|e| self.classify(RecordOp::Update, e))?;
        if affected == 0 {
            return Err(not_found(id));
        }

        tracing::info!(record_id = id, role = %fields.role, "Record updated");
        Ok(())
    }

    fn classify(&self, op: RecordOp, err: StoreError) -> CoreError {
        if self.store.is_duplicate_key_violation(err.as_ref()) {
            tracing::debug!(operation = op.as_str(), error = %err, "Duplicate key");
            CoreError::Conflict(EMAIL_EXISTS.to_string())
        } else {
            CoreError::Internal(format!("{} failed: {err}", op.as_str()))
        }
    }

    fn observe<T>(&self, op: RecordOp, result: Result<T, CoreError>) -> Result<T, CoreError> {
        self.metrics.observe_record_op(op, Outcome::of(&result));
        result
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: RECORD_ENTITY,
        id,
    }
}
