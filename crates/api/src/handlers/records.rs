//! Handlers for the `/api/records` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use roster_db::models::{CreateRecord, UpdateRecord};
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{RecordId, ValidJson};
use crate::state::AppState;

/// Confirmation body for writes that return no entity.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /api/records
///
/// List every record, newest first.
pub async fn list_records(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let records = state.records.list_records().await?;
    Ok(Json(records))
}

/// POST /api/records
///
/// Create a record. Returns 201 with the stored id and resolved role.
pub async fn create_record(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateRecord>,
) -> AppResult<impl IntoResponse> {
    let record = state.records.create_record(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/records/{id}
///
/// Replace name, email and role of an existing record.
pub async fn update_record(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    ValidJson(input): ValidJson<UpdateRecord>,
) -> AppResult<impl IntoResponse> {
    state.records.update_record(id, input).await?;
    Ok(Json(MessageResponse {
        message: "Record updated successfully",
    }))
}

/// DELETE /api/records/{id}
pub async fn delete_record(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> AppResult<impl IntoResponse> {
    state.records.delete_record(id).await?;
    Ok(Json(MessageResponse {
        message: "Record deleted successfully",
    }))
}
