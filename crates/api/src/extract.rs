//! Extractors that turn decoding failures into [`AppError`] responses.
//!
//! Axum's stock rejections are plain text with a mix of 400/415/422
//! statuses; these wrappers keep every rejection in the JSON error shape
//! and short-circuit before the service is called.

use std::num::IntErrorKind;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use roster_core::record::RECORD_ENTITY;
use roster_core::types::DbId;

use crate::error::AppError;

/// JSON body extractor whose rejection is a 400 [`AppError::BadRequest`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// `{id}` path segment parsed as a record id.
///
/// An integer too large for [`DbId`] names no stored record and is a 404;
/// anything that is not an integer is a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub DbId);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        parse_record_id(&raw).map(Self)
    }
}

fn parse_record_id(raw: &str) -> Result<DbId, AppError> {
    match raw.parse::<DbId>() {
        Ok(id) => Ok(id),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(AppError::NotFound(format!(
                "{RECORD_ENTITY} with id {raw} not found"
            )))
        }
        Err(_) => Err(AppError::BadRequest(format!("Invalid record id: '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn integer_ids_parse() {
        assert_eq!(parse_record_id("42").unwrap(), 42);
        assert_eq!(parse_record_id("-1").unwrap(), -1);
    }

    #[test]
    fn out_of_range_id_is_not_found() {
        assert_matches!(
            parse_record_id("99999999999999999999"),
            Err(AppError::NotFound(msg)) if msg == "Record with id 99999999999999999999 not found"
        );
    }

    #[test]
    fn non_integer_id_is_bad_request() {
        assert_matches!(parse_record_id("abc"), Err(AppError::BadRequest(_)));
        assert_matches!(parse_record_id("1.5"), Err(AppError::BadRequest(_)));
        assert_matches!(parse_record_id(""), Err(AppError::BadRequest(_)));
    }
}
