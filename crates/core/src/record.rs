//! Record field rules: required text fields and role resolution.

use crate::error::CoreError;

/// Role assigned when a create request omits one.
pub const DEFAULT_ROLE: &str = "User";

/// Roles the UI offers. The store accepts any non-empty role text.
pub const SUGGESTED_ROLES: &[&str] = &["User", "Admin", "DevOps"];

/// Entity name used in `NotFound` errors.
pub const RECORD_ENTITY: &str = "Record";

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Require a text field to be present and not blank.
///
/// Blankness is judged on the trimmed text; the value is returned as given.
pub fn require_text<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(CoreError::Validation(format!("Field '{field}' must not be empty"))),
        None => Err(CoreError::Validation(format!(
            "Missing required field: {field}"
        ))),
    }
}

/// Resolve an optional role, falling back to [`DEFAULT_ROLE`] when absent or blank.
pub fn resolve_role(role: Option<&str>) -> &str {
    match role {
        Some(r) if !r.trim().is_empty() => r,
        _ => DEFAULT_ROLE,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
