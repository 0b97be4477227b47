//! JSON Schema validation for output contracts.
//!
//! Normalized records are plain JSON objects; callers that need a stronger
//! guarantee than per-field checks can validate outputs against a JSON
//! Schema (Draft 7) contract.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use normalazy::validation::{validate, is_valid};
//!
//! let contract = json!({
//!     "type": "object",
//!     "required": ["email"],
//!     "properties": {
//!         "email": { "type": "string", "format": "email" }
//!     }
//! });
//!
//! let record = json!({ "email": "ada@example.com" });
//! assert!(validate(&contract, &record).is_ok());
//! ```

use serde_json::Value;

/// Validate a JSON object against a JSON Schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with all validation errors otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid contract schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check: just true/false.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}
