//! Transformation operations.
//!
//! The vocabulary of steps that can be chained on a field to turn a raw
//! extracted value into its normalized form. A step either rewrites the
//! value or fails with a message; failures surface as field errors.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());

/// All available transformation operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Remove leading and trailing whitespace
    Trim,

    /// Convert to uppercase
    Uppercase,

    /// Convert to lowercase
    Lowercase,

    /// Replace using regex pattern
    Replace {
        pattern: String,
        #[serde(default)]
        value: String,
    },

    /// Pad string at start to reach target length
    PadStart {
        length: usize,
        #[serde(default = "default_pad_char")]
        char: String,
    },

    /// Pad string at end to reach target length
    PadEnd {
        length: usize,
        #[serde(default = "default_pad_char")]
        char: String,
    },

    /// Extract year (4 digits) from a date string
    ExtractYear,

    /// Ensure string starts with given prefix
    EnsurePrefix { value: String },

    /// Ensure string ends with given suffix
    EnsureSuffix { value: String },

    /// Map values using a lookup table
    Map {
        mapping: HashMap<String, String>,
        #[serde(default)]
        case_insensitive: bool,
        /// Value to use when no mapping matches; without it an unmapped
        /// value is a field error.
        #[serde(default)]
        default_unmapped: Option<String>,
    },

    /// Split string into array
    Split {
        #[serde(default = "default_split_separator")]
        separator: String,
    },

    /// Convert to boolean
    ToBoolean {
        #[serde(default = "default_true_values")]
        true_values: Vec<String>,
    },

    /// Convert to number
    ToNumber,

    /// Parse a date string, normalized to ISO `YYYY-MM-DD`
    ToDate {
        #[serde(default = "default_date_format")]
        format: String,
    },

    /// Parse a date/time string, normalized to ISO `YYYY-MM-DDTHH:MM:SS`
    ToDatetime {
        #[serde(default = "default_datetime_format")]
        format: String,
    },

    /// Take a character range
    Substring {
        start: usize,
        #[serde(default)]
        length: Option<usize>,
    },

    /// Remove all non-alphanumeric characters
    Alphanumeric,

    /// Remove all non-digit characters
    DigitsOnly,
}

fn default_pad_char() -> String {
    "0".to_string()
}

fn default_split_separator() -> String {
    ",".to_string()
}

fn default_true_values() -> Vec<String> {
    vec![
        "true".to_string(),
        "1".to_string(),
        "yes".to_string(),
        "y".to_string(),
        "x".to_string(),
    ]
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_datetime_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Operation {
    /// Apply this operation to a value.
    ///
    /// Null passes through untouched (except `to_boolean`, where null is
    /// `false`), and blank strings pass through the parsing conversions,
    /// so optional fields do not trip conversion steps.
    pub fn apply(&self, value: &Value) -> Result<Value, String> {
        if value.is_null() {
            return Ok(match self {
                Operation::ToBoolean { .. } => Value::Bool(false),
                _ => Value::Null,
            });
        }

        match self {
            Operation::Trim => Ok(self.apply_trim(value)),
            Operation::Uppercase => Ok(self.apply_uppercase(value)),
            Operation::Lowercase => Ok(self.apply_lowercase(value)),
            Operation::Replace { pattern, value: replacement } => {
                self.apply_replace(value, pattern, replacement)
            }
            Operation::PadStart { length, char } => Ok(self.apply_pad_start(value, *length, char)),
            Operation::PadEnd { length, char } => Ok(self.apply_pad_end(value, *length, char)),
            Operation::ExtractYear => self.apply_extract_year(value),
            Operation::EnsurePrefix { value: prefix } => Ok(self.apply_ensure_prefix(value, prefix)),
            Operation::EnsureSuffix { value: suffix } => Ok(self.apply_ensure_suffix(value, suffix)),
            Operation::Map { mapping, case_insensitive, default_unmapped } => {
                self.apply_map(value, mapping, *case_insensitive, default_unmapped.as_deref())
            }
            Operation::Split { separator } => Ok(self.apply_split(value, separator)),
            Operation::ToBoolean { true_values } => Ok(self.apply_to_boolean(value, true_values)),
            Operation::ToNumber => self.apply_to_number(value),
            Operation::ToDate { format } => self.apply_to_date(value, format),
            Operation::ToDatetime { format } => self.apply_to_datetime(value, format),
            Operation::Substring { start, length } => Ok(self.apply_substring(value, *start, *length)),
            Operation::Alphanumeric => Ok(self.apply_alphanumeric(value)),
            Operation::DigitsOnly => Ok(self.apply_digits_only(value)),
        }
    }

    fn as_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn apply_trim(&self, value: &Value) -> Value {
        Self::as_string(value)
            .map(|s| Value::String(s.trim().to_string()))
            .unwrap_or(value.clone())
    }

    fn apply_uppercase(&self, value: &Value) -> Value {
        Self::as_string(value)
            .map(|s| Value::String(s.to_uppercase()))
            .unwrap_or(value.clone())
    }

    fn apply_lowercase(&self, value: &Value) -> Value {
        Self::as_string(value)
            .map(|s| Value::String(s.to_lowercase()))
            .unwrap_or(value.clone())
    }

    fn apply_replace(&self, value: &Value, pattern: &str, replacement: &str) -> Result<Value, String> {
        let Some(s) = Self::as_string(value) else {
            return Ok(value.clone());
        };
        let re = Regex::new(pattern).map_err(|e| format!("invalid pattern '{}': {}", pattern, e))?;
        Ok(Value::String(re.replace_all(&s, replacement).to_string()))
    }

    fn apply_pad_start(&self, value: &Value, length: usize, pad_char: &str) -> Value {
        Self::as_string(value)
            .map(|s| {
                if s.len() >= length {
                    Value::String(s)
                } else {
                    let pad = pad_char.chars().next().unwrap_or('0');
                    let padding: String = std::iter::repeat_n(pad, length - s.len()).collect();
                    Value::String(format!("{}{}", padding, s))
                }
            })
            .unwrap_or(value.clone())
    }

    fn apply_pad_end(&self, value: &Value, length: usize, pad_char: &str) -> Value {
        Self::as_string(value)
            .map(|s| {
                if s.len() >= length {
                    Value::String(s)
                } else {
                    let pad = pad_char.chars().next().unwrap_or('0');
                    let padding: String = std::iter::repeat_n(pad, length - s.len()).collect();
                    Value::String(format!("{}{}", s, padding))
                }
            })
            .unwrap_or(value.clone())
    }

    fn apply_extract_year(&self, value: &Value) -> Result<Value, String> {
        let s = Self::as_string(value)
            .ok_or_else(|| "cannot extract a year from a non-scalar value".to_string())?;
        if s.is_empty() {
            return Ok(Value::String(s));
        }
        YEAR_RE
            .find(&s)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .map(|n| Value::Number(n.into()))
            .ok_or_else(|| format!("no 4-digit year in '{}'", s))
    }

    fn apply_ensure_prefix(&self, value: &Value, prefix: &str) -> Value {
        Self::as_string(value)
            .map(|s| {
                if s.starts_with(prefix) {
                    Value::String(s)
                } else {
                    Value::String(format!("{}{}", prefix, s))
                }
            })
            .unwrap_or(value.clone())
    }

    fn apply_ensure_suffix(&self, value: &Value, suffix: &str) -> Value {
        Self::as_string(value)
            .map(|s| {
                if s.ends_with(suffix) {
                    Value::String(s)
                } else {
                    Value::String(format!("{}{}", s, suffix))
                }
            })
            .unwrap_or(value.clone())
    }

    fn apply_map(
        &self,
        value: &Value,
        mapping: &HashMap<String, String>,
        case_insensitive: bool,
        default_unmapped: Option<&str>,
    ) -> Result<Value, String> {
        let Some(s) = Self::as_string(value) else {
            return Ok(value.clone());
        };

        let found = if case_insensitive {
            let key = s.to_lowercase();
            mapping.iter().find(|(k, _)| k.to_lowercase() == key)
        } else {
            mapping.get_key_value(&s)
        };

        match found {
            Some((_, v)) => Ok(Value::String(v.clone())),
            None => match default_unmapped {
                Some(d) => Ok(Value::String(d.to_string())),
                None => Err(format!("unmapped value '{}'", s)),
            },
        }
    }

    fn apply_split(&self, value: &Value, separator: &str) -> Value {
        Self::as_string(value)
            .map(|s| {
                let parts: Vec<Value> = s
                    .split(separator)
                    .map(|p| Value::String(p.trim().to_string()))
                    .collect();
                Value::Array(parts)
            })
            .unwrap_or(value.clone())
    }

    fn apply_to_boolean(&self, value: &Value, true_values: &[String]) -> Value {
        match value {
            Value::Bool(b) => Value::Bool(*b),
            _ => Self::as_string(value)
                .map(|s| {
                    let lower = s.to_lowercase();
                    Value::Bool(true_values.iter().any(|tv| tv.to_lowercase() == lower))
                })
                .unwrap_or(Value::Bool(false)),
        }
    }

    fn apply_to_number(&self, value: &Value) -> Result<Value, String> {
        if value.is_number() {
            return Ok(value.clone());
        }
        let s = Self::as_string(value)
            .ok_or_else(|| "cannot convert a non-scalar value to a number".to_string())?;
        if s.is_empty() {
            return Ok(Value::String(s));
        }
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Ok(Value::Number(n.into()));
        }
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("cannot convert '{}' to a number", s))
    }

    fn apply_to_date(&self, value: &Value, format: &str) -> Result<Value, String> {
        let s = Self::as_string(value)
            .ok_or_else(|| "cannot parse a non-scalar value as a date".to_string())?;
        if s.is_empty() {
            return Ok(Value::String(s));
        }
        NaiveDate::parse_from_str(s.trim(), format)
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .map_err(|e| format!("cannot parse '{}' as date with format '{}': {}", s, format, e))
    }

    fn apply_to_datetime(&self, value: &Value, format: &str) -> Result<Value, String> {
        let s = Self::as_string(value)
            .ok_or_else(|| "cannot parse a non-scalar value as a datetime".to_string())?;
        if s.is_empty() {
            return Ok(Value::String(s));
        }
        NaiveDateTime::parse_from_str(s.trim(), format)
            .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()))
            .map_err(|e| format!("cannot parse '{}' as datetime with format '{}': {}", s, format, e))
    }

    fn apply_substring(&self, value: &Value, start: usize, length: Option<usize>) -> Value {
        Self::as_string(value)
            .map(|s| {
                let chars: Vec<char> = s.chars().collect();
                let end = length.map(|l| start + l).unwrap_or(chars.len());
                let result: String = chars
                    .get(start..end.min(chars.len()))
                    .map(|c| c.iter().collect())
                    .unwrap_or_default();
                Value::String(result)
            })
            .unwrap_or(value.clone())
    }

    fn apply_alphanumeric(&self, value: &Value) -> Value {
        Self::as_string(value)
            .map(|s| {
                let cleaned: String = s.chars().filter(|c| c.is_alphanumeric()).collect();
                Value::String(cleaned)
            })
            .unwrap_or(value.clone())
    }

    fn apply_digits_only(&self, value: &Value) -> Value {
        Self::as_string(value)
            .map(|s| {
                let cleaned: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
                Value::String(cleaned)
            })
            .unwrap_or(value.clone())
    }
}
