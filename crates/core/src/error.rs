use crate::types::DbId;

/// Domain error taxonomy shared by the service layer and the HTTP surface.
///
/// `Validation` and `NotFound` messages are safe to show to clients.
/// `Internal` carries diagnostic text that must only ever reach the logs.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_entity_and_id() {
        let err = CoreError::NotFound {
            entity: "Record",
            id: 7,
        };
        assert_eq!(err.to_string(), "Record with id 7 not found");
    }

    #[test]
    fn internal_display_keeps_detail_for_logs() {
        let err = CoreError::Internal("connection reset".into());
        assert_eq!(err.to_string(), "Internal error: connection reset");
    }
}
