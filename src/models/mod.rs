//! Domain models for field-level normalization results.
//!
//! This module contains the boxed per-field result used by the detailed
//! inspection API:
//!
//! - [`Status`] - How a field mapping went (success, warning, error)
//! - [`Outcome`] - The mapped value boxed with its status and message

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Status
// =============================================================================

/// Status of one field mapping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Value mapped successfully.
    Success,
    /// Value mapped, but a fallback was used (e.g. default substituted).
    Warning,
    /// Value could not be mapped.
    Error,
}

// =============================================================================
// Outcome
// =============================================================================

/// A mapped value boxed with its status and an optional message.
///
/// Produced per field by [`crate::schema::inspect`]; the counterpart of the
/// plain value in the output record, for callers that want to know *how*
/// each field was resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outcome {
    /// The resolved value (`Null` for errors).
    pub value: Value,
    /// Mapping status.
    pub status: Status,
    /// Message, if any (always present for warnings and errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Outcome {
    /// A successfully mapped value.
    pub fn success(value: Value) -> Self {
        Self {
            value,
            status: Status::Success,
            message: None,
        }
    }

    /// A mapped value with a warning message.
    pub fn warning(value: Value, message: impl Into<String>) -> Self {
        Self {
            value,
            status: Status::Warning,
            message: Some(message.into()),
        }
    }

    /// A failed mapping.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            value: Value::Null,
            status: Status::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_outcome() {
        let outcome = Outcome::success(json!(42));
        assert!(outcome.is_success());
        assert_eq!(outcome.value, json!(42));
        assert!(outcome.message.is_none());
    }

    #[test]
    fn test_warning_outcome() {
        let outcome = Outcome::warning(json!(false), "default substituted");
        assert_eq!(outcome.status, Status::Warning);
        assert_eq!(outcome.message.as_deref(), Some("default substituted"));
    }

    #[test]
    fn test_error_outcome() {
        let outcome = Outcome::error("cannot convert 'abc' to a number");
        assert!(outcome.is_error());
        assert_eq!(outcome.value, Value::Null);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::success(json!("hello"));
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"success\""));
        assert!(!json.contains("message"));
    }
}
