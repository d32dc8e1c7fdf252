//! Record coercion against a stream schema
//!
//! Coercion never fails as a whole. A value that cannot be converted to its
//! declared type is replaced with `null` and reported as a
//! [`SchemaViolation`].
//!
//! String values are reduced to ASCII. Non-ASCII characters are dropped, not
//! transliterated.

use super::types::{JsonType, SchemaProperty, StreamSchema};
use crate::types::{JsonObject, JsonValue};
use std::collections::BTreeMap;

/// A field value that did not match its declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Dotted path of the offending field (e.g. `metrics.sent`)
    pub field: String,
    /// Declared type
    pub expected: JsonType,
    /// JSON type of the raw value
    pub actual: &'static str,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "field '{}' expected {} but got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Result of coercing one record
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    /// The coerced record
    pub record: JsonObject,
    /// Fields that were nulled out
    pub violations: Vec<SchemaViolation>,
}

/// Coerce a raw record against a stream schema
///
/// Declared fields are converted to their declared type. Undeclared fields
/// are dropped unless the schema is open. Missing fields stay missing.
pub fn coerce_record(raw: JsonObject, schema: &StreamSchema) -> Coerced {
    let mut violations = Vec::new();
    let record = coerce_object(
        raw,
        &schema.properties,
        schema.is_open(),
        "",
        &mut violations,
    );
    Coerced { record, violations }
}

fn coerce_object(
    raw: JsonObject,
    properties: &BTreeMap<String, SchemaProperty>,
    open: bool,
    prefix: &str,
    violations: &mut Vec<SchemaViolation>,
) -> JsonObject {
    let mut out = JsonObject::new();
    for (key, value) in raw {
        match properties.get(&key) {
            Some(prop) => {
                let path = join_path(prefix, &key);
                out.insert(key, coerce_value(value, prop, &path, violations));
            }
            None if open => {
                out.insert(key, value);
            }
            None => {}
        }
    }
    out
}

/// Coerce a single value to the property's declared type
pub fn coerce_value(
    value: JsonValue,
    prop: &SchemaProperty,
    path: &str,
    violations: &mut Vec<SchemaViolation>,
) -> JsonValue {
    if value.is_null() {
        return value;
    }
    let Some(expected) = prop.primary_type() else {
        return value;
    };

    let actual = json_type_name(&value);
    let coerced = match (expected, value) {
        (JsonType::String, JsonValue::String(s)) => Some(JsonValue::String(strip_non_ascii(&s))),
        (JsonType::String, JsonValue::Number(n)) => Some(JsonValue::String(n.to_string())),
        (JsonType::String, JsonValue::Bool(b)) => Some(JsonValue::String(b.to_string())),

        (JsonType::Integer, JsonValue::Number(n)) => {
            if n.is_i64() || n.is_u64() {
                Some(JsonValue::Number(n))
            } else {
                n.as_f64().and_then(integral_f64).map(JsonValue::from)
            }
        }
        (JsonType::Integer, JsonValue::String(s)) => {
            s.trim().parse::<i64>().ok().map(JsonValue::from)
        }

        (JsonType::Number, JsonValue::Number(n)) => Some(JsonValue::Number(n)),
        (JsonType::Number, JsonValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(JsonValue::Number),

        (JsonType::Boolean, JsonValue::Bool(b)) => Some(JsonValue::Bool(b)),
        (JsonType::Boolean, JsonValue::String(s)) => match s.trim().to_ascii_lowercase().as_str()
        {
            "true" => Some(JsonValue::Bool(true)),
            "false" => Some(JsonValue::Bool(false)),
            _ => None,
        },

        (JsonType::Object, JsonValue::Object(map)) => Some(JsonValue::Object(match &prop.properties
        {
            Some(nested) => coerce_object(map, nested, true, path, violations),
            None => map,
        })),

        (JsonType::Array, JsonValue::Array(items)) => Some(JsonValue::Array(match &prop.items {
            Some(item_prop) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| coerce_value(item, item_prop, &format!("{path}[{i}]"), violations))
                .collect(),
            None => items,
        })),

        _ => None,
    };

    coerced.unwrap_or_else(|| {
        violations.push(SchemaViolation {
            field: path.to_string(),
            expected,
            actual,
        });
        JsonValue::Null
    })
}

/// Drop every non-ASCII character from a string
pub fn strip_non_ascii(s: &str) -> String {
    if s.is_ascii() {
        s.to_string()
    } else {
        s.chars().filter(char::is_ascii).collect()
    }
}

fn integral_f64(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// JSON type name of a value, for diagnostics
pub fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_f64() => "number",
        JsonValue::Number(_) => "integer",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
