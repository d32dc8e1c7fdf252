//! Parent-derived context for child streams

use crate::types::{scalar_to_string, JsonValue};
use serde::Serialize;
use std::collections::BTreeMap;

/// Placeholder bindings derived from one parent record
///
/// Root streams run with the empty context. A child context contains every
/// binding of its parent's context plus the key derived from the parent
/// record, so records deeper in the hierarchy inherit the whole chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Context {
    values: BTreeMap<String, JsonValue>,
}

impl Context {
    /// The empty (global) context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a binding
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    /// Iterate bindings in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.values.iter()
    }

    /// Binding names in key order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let rendered = scalar_to_string(value).unwrap_or_else(|| value.to_string());
            write!(f, "{key}={rendered}")?;
        }
        f.write_str("}")
    }
}
