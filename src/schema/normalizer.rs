//! Normalization engine.
//!
//! Applies a [`Schema`] to input records. Every field is evaluated even
//! after a failure, so one pass reports all invalid fields of a record.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::models::Outcome;

use super::field::{FieldSpec, Schema};

/// Result of normalizing a batch of records
#[derive(Debug, Default)]
pub struct NormalizeReport {
    /// Successfully normalized records
    pub records: Vec<Value>,
    /// Per-row failures (row index, accumulated field errors)
    pub failures: Vec<RowFailure>,
}

/// A record that failed normalization
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub row: usize,
    pub errors: Vec<FieldError>,
}

impl NormalizeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the batch completed without failures.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Get summary statistics.
    pub fn summary(&self) -> String {
        format!(
            "Normalized: {} records, {} failed",
            self.records.len(),
            self.failures.len()
        )
    }
}

/// Normalize one input record against a schema.
///
/// On success the output object carries exactly the schema's field names,
/// in schema order; fields that resolved to nothing and have no default are
/// present with `null`. On failure, every invalid field is reported.
pub fn normalize(schema: &Schema, record: &Map<String, Value>) -> Result<Value, Vec<FieldError>> {
    let mut output = Map::new();
    let mut errors = Vec::new();

    for spec in &schema.fields {
        match resolve(spec, record) {
            Ok((value, _)) => {
                output.insert(spec.name.clone(), value);
            }
            Err(message) => errors.push(FieldError::new(&spec.name, message)),
        }
    }

    if errors.is_empty() {
        Ok(Value::Object(output))
    } else {
        Err(errors)
    }
}

/// Normalize one record, reporting a boxed [`Outcome`] per field.
///
/// Unlike [`normalize`] this never fails as a whole: callers get the full
/// per-field picture, including which fields fell back to their default.
pub fn inspect(schema: &Schema, record: &Map<String, Value>) -> Vec<(String, Outcome)> {
    schema
        .fields
        .iter()
        .map(|spec| {
            let outcome = match resolve(spec, record) {
                Ok((value, true)) => Outcome::warning(value, "default value substituted"),
                Ok((value, false)) => Outcome::success(value),
                Err(message) => Outcome::error(message),
            };
            (spec.name.clone(), outcome)
        })
        .collect()
}

/// Normalize a batch of records.
///
/// Rows that are not JSON objects, or whose fields fail validation, are
/// collected as failures; the remaining rows normalize independently.
pub fn normalize_all(schema: &Schema, records: &[Value]) -> NormalizeReport {
    let mut report = NormalizeReport::new();

    for (row, record) in records.iter().enumerate() {
        let Some(obj) = record.as_object() else {
            report.failures.push(RowFailure {
                row,
                errors: vec![FieldError::new("*", "record is not a JSON object")],
            });
            continue;
        };

        match normalize(schema, obj) {
            Ok(output) => report.records.push(output),
            Err(errors) => report.failures.push(RowFailure { row, errors }),
        }
    }

    report
}

/// Resolve one field: extract, transform, default, check.
///
/// Returns the final value and whether the default was substituted.
fn resolve(spec: &FieldSpec, record: &Map<String, Value>) -> Result<(Value, bool), String> {
    let raw = extract(spec, record).unwrap_or(Value::Null);

    let (value, defaulted) = if raw.is_null() && spec.default.is_some() {
        // Defaults are final values; they bypass the operation chain.
        (spec.default.clone().unwrap_or(Value::Null), true)
    } else {
        match apply_operations(spec, raw) {
            Ok(value) if is_empty(&value) && spec.default.is_some() => {
                (spec.default.clone().unwrap_or(Value::Null), true)
            }
            Ok(value) => (value, false),
            // A failed chain falls back to the default when one is declared.
            Err(message) => match spec.default.clone() {
                Some(default) => (default, true),
                None => return Err(message),
            },
        }
    };

    if spec.required && is_empty(&value) {
        return Err("required field is missing or empty".to_string());
    }
    if !spec.allow_null && value.is_null() {
        return Err("null value not allowed".to_string());
    }
    if !spec.allow_blank && value.as_str() == Some("") {
        return Err("blank value not allowed".to_string());
    }

    Ok((value, defaulted))
}

/// Run the field's operation chain left to right.
fn apply_operations(spec: &FieldSpec, raw: Value) -> Result<Value, String> {
    let mut value = raw;
    for op in &spec.operations {
        value = op.apply(&value)?;
    }
    Ok(value)
}

/// Get the raw value for a field from the input record.
fn extract(spec: &FieldSpec, record: &Map<String, Value>) -> Option<Value> {
    if let Some(compute) = spec.compute {
        return compute(record);
    }

    if let Some(ref source) = spec.source {
        return record.get(source).cloned();
    }

    if let Some(ref sources) = spec.sources {
        let parts: Vec<String> = sources
            .iter()
            .filter_map(|s| record.get(s))
            .filter_map(|v| v.as_str())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        if parts.is_empty() {
            return None;
        }
        return Some(Value::String(parts.join(&spec.concat_separator)));
    }

    spec.constant.clone()
}

/// Check if a value is "empty" (null, blank string, empty collection).
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use crate::schema::field::{example_schema, FieldSpec};
    use crate::schema::operations::Operation;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_normalize_simple() {
        let schema = example_schema();
        let input = record(json!({
            "Full Name": "  Ada Lovelace  ",
            "E-Mail": "Ada@Example.COM",
            "Role Code": "adm",
            "Age": "36",
            "Member Since": "10/12/1842",
            "Active": "yes"
        }));

        let output = normalize(&schema, &input).unwrap();
        assert_eq!(output["name"], "Ada Lovelace");
        assert_eq!(output["email"], "ada@example.com");
        assert_eq!(output["role"], "admin");
        assert_eq!(output["age"], 36);
        assert_eq!(output["joined"], "1842-12-10");
        assert_eq!(output["active"], true);
    }

    #[test]
    fn test_output_keys_match_schema_order() {
        let schema = example_schema();
        let input = record(json!({
            "Full Name": "Ada",
            "E-Mail": "ada@example.com"
        }));

        let output = normalize(&schema, &input).unwrap();
        let keys: Vec<&String> = output.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name", "email", "role", "age", "joined", "active"]);
    }

    #[test]
    fn test_missing_optional_field_is_null() {
        let schema = Schema::new().field(FieldSpec::key("nickname"));
        let input = record(json!({ "other": "x" }));

        let output = normalize(&schema, &input).unwrap();
        assert_eq!(output["nickname"], Value::Null);
    }

    #[test]
    fn test_errors_accumulate_across_fields() {
        let schema = Schema::new()
            .field(FieldSpec::key("age").with_operation(Operation::ToNumber))
            .field(FieldSpec::key("email").required())
            .field(FieldSpec::key("name"));
        let input = record(json!({ "age": "not a number", "name": "Bob" }));

        let errors = normalize(&schema, &input).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "age");
        assert_eq!(errors[1].field, "email");
    }

    #[test]
    fn test_no_output_on_failure() {
        let schema = Schema::new().field(FieldSpec::key("n").with_operation(Operation::ToNumber));
        let input = record(json!({ "n": "abc" }));
        assert!(normalize(&schema, &input).is_err());
    }

    #[test]
    fn test_normalization_is_pure() {
        let schema = example_schema();
        let input = record(json!({
            "Full Name": "Ada",
            "E-Mail": "ada@example.com",
            "Role Code": "USR"
        }));

        let first = normalize(&schema, &input);
        let second = normalize(&schema, &input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_required_field_rejected_when_missing() {
        let schema = Schema::new().field(FieldSpec::key("email").required());
        let input = record(json!({ "other": "x" }));

        let errors = normalize(&schema, &input).unwrap_err();
        assert_eq!(errors[0].field, "email");
        assert!(errors[0].message.contains("required"));
    }

    #[test]
    fn test_blank_rejected_when_not_allowed() {
        let schema = Schema::new().field(FieldSpec::key("a").not_blank());
        let input = record(json!({ "a": "" }));

        let errors = normalize(&schema, &input).unwrap_err();
        assert!(errors[0].message.contains("blank"));
    }

    #[test]
    fn test_null_rejected_when_not_allowed() {
        let schema = Schema::new().field(FieldSpec::key("a").not_null());
        let input = record(json!({}));

        let errors = normalize(&schema, &input).unwrap_err();
        assert!(errors[0].message.contains("null"));
    }

    #[test]
    fn test_blank_allowed_by_default() {
        let schema = Schema::new().field(FieldSpec::key("a"));
        let input = record(json!({ "a": "" }));

        let output = normalize(&schema, &input).unwrap();
        assert_eq!(output["a"], "");
    }

    #[test]
    fn test_default_value() {
        let schema = Schema::new().field(
            FieldSpec::from_source("instrumental", "Missing Column").with_default(json!(false)),
        );
        let input = record(json!({ "other_field": "value" }));

        let output = normalize(&schema, &input).unwrap();
        assert_eq!(output["instrumental"], false);
    }

    #[test]
    fn test_default_applies_when_operations_empty_the_value() {
        let schema = Schema::new().field(
            FieldSpec::key("code")
                .with_operation(Operation::DigitsOnly)
                .with_default(json!("0")),
        );
        let input = record(json!({ "code": "abc" }));

        let output = normalize(&schema, &input).unwrap();
        assert_eq!(output["code"], "0");
    }

    #[test]
    fn test_default_rescues_failed_chain() {
        let mut mapping = std::collections::HashMap::new();
        mapping.insert("ADM".to_string(), "admin".to_string());
        let schema = Schema::new().field(
            FieldSpec::key("role")
                .with_operation(Operation::Map {
                    mapping,
                    case_insensitive: false,
                    default_unmapped: None,
                })
                .with_default(json!("member")),
        );
        let input = record(json!({ "role": "XYZ" }));

        let output = normalize(&schema, &input).unwrap();
        assert_eq!(output["role"], "member");

        let outcomes = inspect(&schema, &input);
        assert_eq!(outcomes[0].1.status, Status::Warning);
        assert_eq!(outcomes[0].1.value, json!("member"));
    }

    #[test]
    fn test_failed_chain_without_default_is_an_error() {
        let schema = Schema::new().field(FieldSpec::key("n").with_operation(Operation::ToNumber));
        let input = record(json!({ "n": "oops" }));

        let errors = normalize(&schema, &input).unwrap_err();
        assert_eq!(errors[0].field, "n");
    }

    #[test]
    fn test_constant_value() {
        let schema = Schema::new().field(FieldSpec::from_constant("language", json!("French")));
        let input = record(json!({ "any_field": "any_value" }));

        let output = normalize(&schema, &input).unwrap();
        assert_eq!(output["language"], "French");
    }

    #[test]
    fn test_multiple_sources_concat() {
        let schema = Schema::new().field(FieldSpec::from_sources(
            "title",
            vec!["Title Prefix".to_string(), "Title Main".to_string()],
            " ",
        ));
        let input = record(json!({
            "Title Prefix": "The Amazing",
            "Title Main": "Journey"
        }));

        let output = normalize(&schema, &input).unwrap();
        assert_eq!(output["title"], "The Amazing Journey");
    }

    #[test]
    fn test_multiple_sources_skip_empty() {
        let schema = Schema::new().field(FieldSpec::from_sources(
            "title",
            vec!["Title Prefix".to_string(), "Title Main".to_string()],
            " ",
        ));
        let input = record(json!({
            "Title Prefix": "",
            "Title Main": "Solo Title"
        }));

        let output = normalize(&schema, &input).unwrap();
        assert_eq!(output["title"], "Solo Title");
    }

    #[test]
    fn test_computed_field() {
        let schema = Schema::new().field(FieldSpec::computed("full", |row| {
            let first = row.get("first")?.as_str()?;
            let last = row.get("last")?.as_str()?;
            Some(json!(format!("{} {}", first, last)))
        }));
        let input = record(json!({ "first": "Ada", "last": "Lovelace" }));

        let output = normalize(&schema, &input).unwrap();
        assert_eq!(output["full"], "Ada Lovelace");
    }

    #[test]
    fn test_missing_boolean_defaults_to_false() {
        let schema = Schema::new().field(FieldSpec::key("active").with_operation(
            Operation::ToBoolean { true_values: vec!["yes".to_string()] },
        ));
        let input = record(json!({}));

        let output = normalize(&schema, &input).unwrap();
        assert_eq!(output["active"], false);
    }

    #[test]
    fn test_inspect_statuses() {
        let schema = Schema::new()
            .field(FieldSpec::key("a").with_operation(Operation::Trim))
            .field(FieldSpec::key("b").with_default(json!("fallback")))
            .field(FieldSpec::key("c").with_operation(Operation::ToNumber));
        let input = record(json!({ "a": " x ", "c": "oops" }));

        let outcomes = inspect(&schema, &input);
        assert_eq!(outcomes[0].1, Outcome::success(json!("x")));
        assert_eq!(outcomes[1].1.status, Status::Warning);
        assert_eq!(outcomes[1].1.value, json!("fallback"));
        assert!(outcomes[2].1.is_error());
    }

    #[test]
    fn test_normalize_all() {
        let schema = Schema::new().field(FieldSpec::key("n").with_operation(Operation::ToNumber));
        let records = vec![
            json!({ "n": "1" }),
            json!({ "n": "two" }),
            json!("not an object"),
            json!({ "n": "3" }),
        ];

        let report = normalize_all(&schema, &records);
        assert!(!report.is_ok());
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].row, 1);
        assert_eq!(report.failures[1].row, 2);
        assert_eq!(report.summary(), "Normalized: 2 records, 2 failed");
    }
}
