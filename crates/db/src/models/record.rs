//! Record models and DTOs.

use roster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `records` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Record {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: Timestamp,
}

/// Response body for a freshly inserted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRecord {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Validated values for the three mutable columns.
///
/// Used for both inserts and full-replace updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl RecordFields {
    pub fn into_created(self, id: DbId) -> CreatedRecord {
        CreatedRecord {
            id,
            name: self.name,
            email: self.email,
            role: self.role,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a record. `role` falls back to the default role.
///
/// Fields are optional so missing values reach validation and produce a
/// field-specific 400 instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// DTO for replacing a record's name, email and role.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}
