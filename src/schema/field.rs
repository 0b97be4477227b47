//! Schema definition.
//!
//! A [`Schema`] is an ordered list of [`FieldSpec`]s: one per output field,
//! each naming where its value comes from and which operations to run on it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};

use super::operations::Operation;

/// A function computing a field value from the whole input record.
///
/// Escape hatch for mappings the declarative operations cannot express.
/// Not serializable; schemas loaded from JSON never carry one.
pub type ComputeFn = fn(&Map<String, Value>) -> Option<Value>;

/// Specification of a single output field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Output field name, unique within a schema.
    pub name: String,

    /// Source key in the input record (mutually exclusive with sources,
    /// constant and compute)
    #[serde(default)]
    pub source: Option<String>,

    /// Multiple source keys to concatenate (mutually exclusive with source
    /// and constant)
    #[serde(default)]
    pub sources: Option<Vec<String>>,

    /// Separator for concatenating multiple sources (default: " ")
    #[serde(default = "default_concat_separator")]
    pub concat_separator: String,

    /// Constant value (mutually exclusive with source/sources)
    #[serde(default)]
    pub constant: Option<Value>,

    /// Ordered list of operations to apply
    #[serde(default)]
    pub operations: Vec<Operation>,

    /// Default value if the field resolves to nothing
    #[serde(default)]
    pub default: Option<Value>,

    /// Whether this field must resolve to a non-empty value
    #[serde(default)]
    pub required: bool,

    /// Whether a null value is acceptable
    #[serde(default = "default_true")]
    pub allow_null: bool,

    /// Whether a blank string is acceptable
    #[serde(default = "default_true")]
    pub allow_blank: bool,

    /// Computed extraction function (code-defined schemas only)
    #[serde(skip)]
    pub compute: Option<ComputeFn>,
}

fn default_concat_separator() -> String {
    " ".to_string()
}

fn default_true() -> bool {
    true
}

impl FieldSpec {
    /// A field reading the input key of the same name.
    pub fn key(name: &str) -> Self {
        Self::from_source(name, name)
    }

    /// A field reading a single input key.
    pub fn from_source(name: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            source: Some(source.to_string()),
            sources: None,
            concat_separator: default_concat_separator(),
            constant: None,
            operations: Vec::new(),
            default: None,
            required: false,
            allow_null: true,
            allow_blank: true,
            compute: None,
        }
    }

    /// A field concatenating multiple input keys.
    pub fn from_sources(name: &str, sources: Vec<String>, separator: &str) -> Self {
        Self {
            name: name.to_string(),
            source: None,
            sources: Some(sources),
            concat_separator: separator.to_string(),
            constant: None,
            operations: Vec::new(),
            default: None,
            required: false,
            allow_null: true,
            allow_blank: true,
            compute: None,
        }
    }

    /// A field with a constant value.
    pub fn from_constant(name: &str, value: Value) -> Self {
        Self {
            name: name.to_string(),
            source: None,
            sources: None,
            concat_separator: default_concat_separator(),
            constant: Some(value),
            operations: Vec::new(),
            default: None,
            required: false,
            allow_null: true,
            allow_blank: true,
            compute: None,
        }
    }

    /// A field computed by a function over the whole input record.
    pub fn computed(name: &str, compute: ComputeFn) -> Self {
        Self {
            name: name.to_string(),
            source: None,
            sources: None,
            concat_separator: default_concat_separator(),
            constant: None,
            operations: Vec::new(),
            default: None,
            required: false,
            allow_null: true,
            allow_blank: true,
            compute: Some(compute),
        }
    }

    /// Add an operation to the chain.
    pub fn with_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Mark as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Reject null values.
    pub fn not_null(mut self) -> Self {
        self.allow_null = false;
        self
    }

    /// Reject blank strings.
    pub fn not_blank(mut self) -> Self {
        self.allow_blank = false;
        self
    }

    /// Get all source keys referenced by this field.
    pub fn get_sources(&self) -> Vec<String> {
        let mut result = Vec::new();
        if let Some(ref s) = self.source {
            result.push(s.clone());
        }
        if let Some(ref ss) = self.sources {
            result.extend(ss.clone());
        }
        result
    }
}

/// A complete schema defining the shape of one output record.
///
/// Fields are ordered; output records carry exactly these field names, in
/// this order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// Version of the schema format
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Ordered field specifications
    pub fields: Vec<FieldSpec>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self {
            version: default_version(),
            description: String::new(),
            fields: Vec::new(),
        }
    }

    /// Append a field specification.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Parse a schema from a JSON string.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let schema: Self = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Parse a schema from a JSON value.
    pub fn from_value(value: &Value) -> SchemaResult<Self> {
        let schema: Self = serde_json::from_value(value.clone())?;
        schema.validate()?;
        Ok(schema)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Output field names, in schema order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// All source keys referenced by the schema, deduplicated.
    pub fn source_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.fields.iter().flat_map(|f| f.get_sources()).collect();
        columns.sort();
        columns.dedup();
        columns
    }

    /// Source keys referenced by required fields only.
    pub fn required_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .flat_map(|f| f.get_sources())
            .collect();
        columns.sort();
        columns.dedup();
        columns
    }

    /// Check the schema definition itself: unique non-empty field names,
    /// a single extraction rule per field, compilable regex patterns.
    pub fn validate(&self) -> SchemaResult<()> {
        let mut seen = HashSet::new();
        for spec in &self.fields {
            if spec.name.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if !seen.insert(spec.name.clone()) {
                return Err(SchemaError::DuplicateField(spec.name.clone()));
            }

            let rules = [
                spec.source.is_some(),
                spec.sources.is_some(),
                spec.constant.is_some(),
                spec.compute.is_some(),
            ];
            if rules.iter().filter(|r| **r).count() > 1 {
                return Err(SchemaError::ConflictingSource(spec.name.clone()));
            }

            for op in &spec.operations {
                if let Operation::Replace { pattern, .. } = op {
                    regex::Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
                        field: spec.name.clone(),
                        message: e.to_string(),
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Validate that all referenced source keys exist in the given headers.
    pub fn validate_headers(&self, headers: &[String]) -> Result<(), Vec<String>> {
        let missing: Vec<String> = self
            .source_columns()
            .into_iter()
            .filter(|col| !headers.iter().any(|h| h == col))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate an example schema for documentation and tests.
pub fn example_schema() -> Schema {
    let mut role_mapping = std::collections::HashMap::new();
    role_mapping.insert("ADM".to_string(), "admin".to_string());
    role_mapping.insert("USR".to_string(), "member".to_string());
    role_mapping.insert("GST".to_string(), "guest".to_string());

    Schema {
        version: default_version(),
        description: "Example schema normalizing a user directory export".to_string(),
        fields: vec![
            FieldSpec::from_source("name", "Full Name")
                .with_operation(Operation::Trim)
                .required(),
            FieldSpec::from_source("email", "E-Mail")
                .with_operation(Operation::Trim)
                .with_operation(Operation::Lowercase)
                .required()
                .not_blank(),
            FieldSpec::from_source("role", "Role Code")
                .with_operation(Operation::Trim)
                .with_operation(Operation::Uppercase)
                .with_operation(Operation::Map {
                    mapping: role_mapping,
                    case_insensitive: true,
                    default_unmapped: None,
                })
                .with_default(Value::String("member".to_string())),
            FieldSpec::from_source("age", "Age").with_operation(Operation::ToNumber),
            FieldSpec::from_source("joined", "Member Since")
                .with_operation(Operation::ToDate { format: "%d/%m/%Y".to_string() }),
            FieldSpec::from_source("active", "Active").with_operation(Operation::ToBoolean {
                true_values: vec!["yes".to_string(), "1".to_string(), "true".to_string()],
            }),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_serialization() {
        let schema = example_schema();
        let json = schema.to_json().unwrap();
        let parsed = Schema::from_json(&json).unwrap();
        assert_eq!(parsed.version, schema.version);
        assert_eq!(parsed.field_names(), schema.field_names());
    }

    #[test]
    fn test_field_order_preserved() {
        let schema = example_schema();
        assert_eq!(
            schema.field_names(),
            vec!["name", "email", "role", "age", "joined", "active"]
        );
    }

    #[test]
    fn test_validate_headers() {
        let schema = example_schema();
        let headers: Vec<String> = ["Full Name", "E-Mail", "Role Code", "Age", "Member Since", "Active"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(schema.validate_headers(&headers).is_ok());

        let missing_headers = vec!["Full Name".to_string()];
        let result = schema.validate_headers(&missing_headers);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains(&"E-Mail".to_string()));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let schema = Schema::new()
            .field(FieldSpec::key("a"))
            .field(FieldSpec::key("a"));
        assert!(matches!(schema.validate(), Err(SchemaError::DuplicateField(_))));
    }

    #[test]
    fn test_conflicting_source_rejected() {
        let mut spec = FieldSpec::key("a");
        spec.constant = Some(Value::String("x".to_string()));
        let schema = Schema::new().field(spec);
        assert!(matches!(schema.validate(), Err(SchemaError::ConflictingSource(_))));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let schema = Schema::new().field(
            FieldSpec::key("a").with_operation(Operation::Replace {
                pattern: "[".to_string(),
                value: "".to_string(),
            }),
        );
        assert!(matches!(schema.validate(), Err(SchemaError::InvalidPattern { .. })));
    }

    #[test]
    fn test_required_columns() {
        let schema = example_schema();
        assert_eq!(
            schema.required_columns(),
            vec!["E-Mail".to_string(), "Full Name".to_string()]
        );
    }

    #[test]
    fn test_from_json_validates() {
        let json = r#"{
            "fields": [
                { "name": "a", "source": "A" },
                { "name": "a", "source": "B" }
            ]
        }"#;
        assert!(Schema::from_json(json).is_err());
    }

    #[test]
    fn test_computed_field_not_serialized() {
        let schema = Schema::new().field(FieldSpec::computed("n", |row| {
            row.get("x").cloned()
        }));
        let json = schema.to_json().unwrap();
        assert!(!json.contains("compute"));
    }
}
