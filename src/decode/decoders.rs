//! Decoder implementations

use super::types::{CustomExtraction, RecordDecoder, RecordSelector};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};

impl RecordDecoder for RecordSelector {
    fn decode(&self, body: &JsonValue) -> Result<Vec<JsonObject>> {
        match self {
            Self::WholeBody => match body {
                JsonValue::Object(map) => Ok(vec![map.clone()]),
                JsonValue::Array(items) => objects(items, self),
                JsonValue::Null => Ok(Vec::new()),
                other => Err(Error::extraction(
                    self.describe(),
                    format!("expected an object or array, got {other}"),
                )),
            },
            Self::ArrayUnderKey(key) => match array_under(body, key, self)? {
                Some(items) => objects(items, self),
                None => Ok(Vec::new()),
            },
            Self::Custom(CustomExtraction::CampaignActions) => {
                match array_under(body, "actions", self)? {
                    Some(items) => objects(items, self)
                        .map(|actions| actions.into_iter().map(map_action).collect()),
                    None => Ok(Vec::new()),
                }
            }
        }
    }
}

/// Array under a top-level key; absent or null means "no records"
fn array_under<'a>(
    body: &'a JsonValue,
    key: &str,
    selector: &RecordSelector,
) -> Result<Option<&'a Vec<JsonValue>>> {
    match body.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Array(items)) => Ok(Some(items)),
        Some(other) => Err(Error::extraction(
            selector.describe(),
            format!("expected an array under '{key}', got {other}"),
        )),
    }
}

fn objects(items: &[JsonValue], selector: &RecordSelector) -> Result<Vec<JsonObject>> {
    items
        .iter()
        .map(|item| match item {
            JsonValue::Object(map) => Ok(map.clone()),
            other => Err(Error::extraction(
                selector.describe(),
                format!("expected record objects, got {other}"),
            )),
        })
        .collect()
}

/// Provider fields copied as-is from an action
const ACTION_FIELDS: &[&str] = &[
    "id",
    "campaign_id",
    "parent_action_id",
    "deduplicate_id",
    "name",
    "layout",
    "created",
    "updated",
    "body_amp",
    "language",
    "type",
    "sending_state",
    "from_id",
    "reply_to",
    "reply_to_id",
    "preprocessor",
    "recipient",
    "bcc",
    "fake_bcc",
];

/// Text fields that are never null in emitted actions
const ACTION_TEXT_DEFAULTS: &[&str] = &["subject", "preheader_text"];

/// Remap one raw action
///
/// Every mapped field is present in the output (null when the provider
/// omitted it). `from` is renamed to `from_email`.
pub fn map_action(mut action: JsonObject) -> JsonObject {
    let mut out = JsonObject::new();

    for field in ACTION_FIELDS {
        let value = action.remove(*field).unwrap_or(JsonValue::Null);
        out.insert((*field).to_string(), value);
    }

    out.insert(
        "from_email".to_string(),
        action.remove("from").unwrap_or(JsonValue::Null),
    );

    for field in ACTION_TEXT_DEFAULTS {
        let value = match action.remove(*field) {
            None | Some(JsonValue::Null) => JsonValue::String(String::new()),
            Some(value) => value,
        };
        out.insert((*field).to_string(), value);
    }

    out
}
