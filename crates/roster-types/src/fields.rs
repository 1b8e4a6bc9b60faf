//! Field maps and the helpers declared types use to read them.

use serde_json::Value;

use crate::error::ValidationError;
use crate::temporal::Timestamp;

/// Ordered mapping of field name to JSON value.
pub type Fields = serde_json::Map<String, Value>;

/// Take an optional string field. Absent and `null` both yield `None`.
pub fn take_opt_string(fields: &mut Fields, name: &str) -> Result<Option<String>, ValidationError> {
    match fields.remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(wrong_kind(name, "string", &other)),
    }
}

/// Take a required string field.
pub fn take_string(fields: &mut Fields, name: &str) -> Result<String, ValidationError> {
    take_opt_string(fields, name)?.ok_or_else(|| ValidationError::MissingField(name.to_string()))
}

/// Take an optional boolean field.
pub fn take_opt_bool(fields: &mut Fields, name: &str) -> Result<Option<bool>, ValidationError> {
    match fields.remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(other) => Err(wrong_kind(name, "boolean", &other)),
    }
}

/// Take a free-form JSON field, `null` when absent.
pub fn take_value(fields: &mut Fields, name: &str) -> Value {
    fields.remove(name).unwrap_or(Value::Null)
}

/// Take an optional timestamp stored as a fixed-format string.
pub fn take_timestamp(fields: &mut Fields, name: &str) -> Result<Option<Timestamp>, ValidationError> {
    match take_opt_string(fields, name)? {
        None => Ok(None),
        Some(raw) => Timestamp::parse(&raw)
            .map(Some)
            .map_err(|_| ValidationError::InvalidTimestamp {
                field: name.to_string(),
                value: raw,
            }),
    }
}

/// JSON rendering of an optional string: the string or `null`.
pub fn opt_string(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

fn wrong_kind(name: &str, expected: &str, got: &Value) -> ValidationError {
    ValidationError::InvalidField {
        field: name.to_string(),
        reason: format!("expected {expected}, got {}", kind_name(got)),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
