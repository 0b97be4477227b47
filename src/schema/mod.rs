//! Declarative schema for record mapping and normalization
//!
//! This module provides:
//! - `field`: Schema and field specifications
//! - `operations`: Available transformation operations
//! - `normalizer`: Apply schemas to input records
//!
//! ## Usage Flow
//!
//! ```text
//! CSV/JSON → parser → Schema + normalize → Output record | field errors
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use normalazy::{Schema, FieldSpec, Operation, normalize};
//!
//! let schema = Schema::new()
//!     .field(FieldSpec::from_source("email", "E-Mail")
//!         .with_operation(Operation::Trim)
//!         .with_operation(Operation::Lowercase)
//!         .required());
//!
//! let input = serde_json::json!({ "E-Mail": " Ada@Example.COM " });
//! match normalize(&schema, input.as_object().unwrap()) {
//!     Ok(record) => println!("{}", record),
//!     Err(errors) => println!("invalid: {:?}", errors),
//! }
//! ```

pub mod field;
pub mod normalizer;
pub mod operations;

// Re-exports for convenience
pub use field::{example_schema, ComputeFn, FieldSpec, Schema};
pub use normalizer::{inspect, normalize, normalize_all, NormalizeReport, RowFailure};
pub use operations::Operation;
