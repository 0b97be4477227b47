//! High-level pipeline API for CSV and JSON normalization.
//!
//! This module provides easy-to-use functions that combine all steps:
//! parsing, schema validation, normalization, and contract validation.
//!
//! # Example
//!
//! ```rust,ignore
//! use normalazy::pipeline::{normalize_csv, NormalizeOptions};
//! use normalazy::schema::example_schema;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("users.csv")?;
//!     let schema = example_schema();
//!     let result = normalize_csv(&bytes, &schema, &NormalizeOptions::default())?;
//!
//!     println!("Normalized {} records", result.records.len());
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};
use crate::schema::{normalize_all, RowFailure, Schema};
use crate::validation::validate;

/// Options for the normalization pipeline
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Optional JSON Schema contract checked against every normalized record
    pub contract: Option<Value>,
}

/// Result of a complete normalization pipeline
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Normalized records, one JSON object per successful input row
    pub records: Vec<Value>,

    /// Rows that failed normalization, with their accumulated field errors
    pub failures: Vec<RowFailure>,

    /// Contract violations (record index, errors)
    pub contract_errors: Vec<(usize, Vec<String>)>,

    /// Input parsing metadata
    pub csv_info: CsvInfo,
}

impl PipelineReport {
    /// True when every row normalized cleanly and passed the contract.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty() && self.contract_errors.is_empty()
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Normalize a CSV file.
///
/// This is the main entry point for the pipeline. It:
/// 1. Parses the CSV with encoding and delimiter auto-detection
/// 2. Validates the schema and checks required source columns
/// 3. Normalizes every row, accumulating per-field errors
/// 4. Optionally validates each output against a JSON Schema contract
pub fn normalize_csv_file<P: AsRef<Path>>(
    path: P,
    schema: &Schema,
    options: &NormalizeOptions,
) -> Result<PipelineReport, PipelineError> {
    let parsed = parse_csv_file_auto(path)?;
    normalize_parsed(parsed, schema, options)
}

/// Normalize raw CSV bytes.
///
/// Same as `normalize_csv_file` but accepts in-memory content.
pub fn normalize_csv(
    bytes: &[u8],
    schema: &Schema,
    options: &NormalizeOptions,
) -> Result<PipelineReport, PipelineError> {
    let parsed = parse_bytes_auto(bytes)?;
    normalize_parsed(parsed, schema, options)
}

/// Normalize already-parsed records.
///
/// Useful when the input came from JSON or another source that skips
/// CSV detection entirely.
pub fn normalize_records(
    records: Vec<Value>,
    headers: Vec<String>,
    schema: &Schema,
    options: &NormalizeOptions,
) -> Result<PipelineReport, PipelineError> {
    let parsed = ParseResult {
        records,
        encoding: "utf-8".to_string(),
        delimiter: ',',
        headers,
    };
    normalize_parsed(parsed, schema, options)
}

/// Internal: normalize parsed input
fn normalize_parsed(
    parsed: ParseResult,
    schema: &Schema,
    options: &NormalizeOptions,
) -> Result<PipelineReport, PipelineError> {
    info!(
        encoding = %parsed.encoding,
        delimiter = %parsed.delimiter,
        rows = parsed.records.len(),
        "parsed input"
    );

    let csv_info = CsvInfo {
        encoding: parsed.encoding.clone(),
        delimiter: parsed.delimiter,
        headers: parsed.headers.clone(),
        row_count: parsed.records.len(),
    };

    if parsed.records.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    schema.validate()?;
    check_columns(schema, &parsed.headers)?;

    let report = normalize_all(schema, &parsed.records);
    info!("{}", report.summary());

    let mut contract_errors = Vec::new();
    if let Some(contract) = &options.contract {
        for (i, record) in report.records.iter().enumerate() {
            if let Err(errors) = validate(contract, record) {
                contract_errors.push((i, errors));
            }
        }
        if contract_errors.is_empty() {
            info!("all records satisfy the output contract");
        } else {
            warn!(count = contract_errors.len(), "records violate the output contract");
        }
    }

    Ok(PipelineReport {
        records: report.records,
        failures: report.failures,
        contract_errors,
        csv_info,
    })
}

/// Missing required columns abort the pipeline; missing optional columns
/// only produce a warning, because their fields can still fall back to
/// defaults or null.
fn check_columns(schema: &Schema, headers: &[String]) -> Result<(), PipelineError> {
    let required: Vec<String> = schema
        .required_columns()
        .into_iter()
        .filter(|c| !headers.contains(c))
        .collect();
    if !required.is_empty() {
        return Err(PipelineError::MissingColumns(required));
    }

    let optional: Vec<String> = schema
        .source_columns()
        .into_iter()
        .filter(|c| !headers.contains(c))
        .collect();
    if !optional.is_empty() {
        warn!(columns = ?optional, "optional source columns missing from input");
    }

    Ok(())
}
