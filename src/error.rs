//! Error types for the normalization pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ParseError`] - CSV/JSON ingestion errors
//! - [`SchemaError`] - Schema definition errors
//! - [`FieldError`] - Per-field validation errors (the unit of accumulation)
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Ingestion Errors
// =============================================================================

/// Errors during CSV/JSON ingestion.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read input.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode bytes with the detected encoding.
    #[error("Failed to decode input: {0}")]
    Encoding(String),

    /// Malformed CSV.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON input was not an array of objects.
    #[error("Expected a JSON array of objects")]
    NotAnArray,

    /// Input was empty.
    #[error("Input is empty")]
    EmptyInput,

    /// No column headers found.
    #[error("No headers found")]
    NoHeaders,

    /// Delimiter outside the ASCII range.
    #[error("Delimiter must be an ASCII character, got '{0}'")]
    InvalidDelimiter(char),
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors in a schema definition.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two fields share the same name.
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// A field has an empty name.
    #[error("Field name cannot be empty")]
    EmptyFieldName,

    /// A field declares more than one extraction rule.
    #[error("Field '{0}' has conflicting extraction rules (source/sources/constant)")]
    ConflictingSource(String),

    /// A regex operation carries an invalid pattern.
    #[error("Invalid pattern in field '{field}': {message}")]
    InvalidPattern { field: String, message: String },

    /// Schema (de)serialization error.
    #[error("Schema JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Field Validation Errors
// =============================================================================

/// A validation error scoped to one field of one record.
///
/// Normalization collects these instead of short-circuiting, so callers
/// see every invalid field at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("field '{field}': {message}")]
pub struct FieldError {
    /// Name of the schema field that failed.
    pub field: String,
    /// Human-readable failure message.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::normalize_csv`].
/// It wraps all lower-level errors and adds pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Ingestion error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Schema definition error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// No records to normalize.
    #[error("No records to normalize")]
    EmptyInput,

    /// Columns required by the schema are absent from the input headers.
    #[error("Missing source columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ParseError -> PipelineError
        let parse_err = ParseError::EmptyInput;
        let pipeline_err: PipelineError = parse_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // SchemaError -> PipelineError
        let schema_err = SchemaError::DuplicateField("title".into());
        let pipeline_err: PipelineError = schema_err.into();
        assert!(pipeline_err.to_string().contains("title"));
    }

    #[test]
    fn test_field_error_format() {
        let err = FieldError::new("role", "unmapped value 'X'");
        let msg = err.to_string();
        assert!(msg.contains("role"));
        assert!(msg.contains("unmapped value 'X'"));
    }

    #[test]
    fn test_missing_columns_format() {
        let err = PipelineError::MissingColumns(vec!["a".into(), "b".into()]);
        assert!(err.to_string().contains("a, b"));
    }
}
