//! # Normalazy - declarative record mapping and normalization
//!
//! Normalazy maps untyped string-keyed records (CSV rows, JSON objects) onto
//! a declared schema: each output field names its sources, an ordered chain
//! of operations, and validation flags. Errors are accumulated per field
//! rather than aborting at the first problem.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV / JSON │────▶│   Parser    │────▶│  Normalizer │────▶│ Output JSON │
//! │   (bytes)   │     │ (auto-enc)  │     │ (schema DSL)│     │  (ordered)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use normalazy::{normalize_csv, NormalizeOptions};
//! use normalazy::schema::example_schema;
//!
//! fn main() {
//!     let bytes = std::fs::read("users.csv").unwrap();
//!     let schema = example_schema();
//!     let result = normalize_csv(&bytes, &schema, &NormalizeOptions::default()).unwrap();
//!     println!("Normalized {} records", result.records.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Field outcome reporting (Outcome, Status)
//! - [`parser`] - CSV/JSON parsing with auto-detection
//! - [`schema`] - Schema DSL, operations, and the normalizer
//! - [`validation`] - JSON Schema contract validation
//! - [`pipeline`] - End-to-end normalization pipeline

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Schema DSL and normalization
pub mod schema;

// Validation
pub mod validation;

// Pipeline
pub mod pipeline;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{FieldError, ParseError, PipelineError, SchemaError, SchemaResult};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Outcome, Status};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    csv_to_records,
    decode_content,
    detect_delimiter,
    detect_encoding,
    json_to_records,
    parse_bytes_auto,
    parse_csv,
    parse_csv_file_auto,
    ParseResult,
};

// =============================================================================
// Re-exports - Schema DSL
// =============================================================================

pub use schema::{
    example_schema,
    inspect,
    normalize,
    normalize_all,
    ComputeFn,
    FieldSpec,
    NormalizeReport,
    Operation,
    RowFailure,
    Schema,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid, validate};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    normalize_csv,
    normalize_csv_file,
    normalize_records,
    CsvInfo,
    NormalizeOptions,
    PipelineReport,
};
