//! Schema registry module
//!
//! Declared per-stream schemas and record coercion.
//!
//! # Features
//!
//! - **Explicit Descriptors**: Each stream carries its own `StreamSchema`
//! - **Type Coercion**: Numeric, boolean and string values are converted to
//!   their declared type where possible
//! - **Local Recovery**: Uncoercible values become `null` and are reported
//! - **Open Schemas**: Passthrough of undeclared fields when requested

mod coercion;
mod types;

pub use coercion::{
    coerce_record, coerce_value, json_type_name, strip_non_ascii, Coerced, SchemaViolation,
};
pub use types::{JsonType, JsonTypeOrArray, SchemaProperty, StreamSchema};
