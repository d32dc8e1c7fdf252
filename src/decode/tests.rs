//! Decoder tests

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[test]
fn test_array_under_key() {
    let selector = RecordSelector::array_under("campaigns");
    let records = selector
        .decode(&json!({"campaigns": [{"id": 1}, {"id": 2}]}))
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], 1);
    assert_eq!(records[1]["id"], 2);
}

#[test]
fn test_array_under_key_absent_or_null() {
    let selector = RecordSelector::array_under("segments");
    assert!(selector.decode(&json!({})).unwrap().is_empty());
    assert!(selector.decode(&json!({"segments": null})).unwrap().is_empty());
    assert!(selector.decode(&json!({"segments": []})).unwrap().is_empty());
}

#[test]
fn test_array_under_key_wrong_shape() {
    let selector = RecordSelector::array_under("segments");
    let err = selector.decode(&json!({"segments": {"id": 1}})).unwrap_err();
    assert!(matches!(err, Error::RecordExtraction { .. }));
    assert!(err.to_string().contains("$.segments[*]"));

    let err = selector.decode(&json!({"segments": [1, 2]})).unwrap_err();
    assert!(matches!(err, Error::RecordExtraction { .. }));
}

#[test]
fn test_whole_body_object() {
    let records = RecordSelector::WholeBody.decode(&json!({"foo": 1})).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(Value::Object(records[0].clone()), json!({"foo": 1}));
}

#[test]
fn test_whole_body_array() {
    let records = RecordSelector::WholeBody
        .decode(&json!([{"a": 1}, {"a": 2}]))
        .unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_whole_body_scalar_is_error() {
    assert!(RecordSelector::WholeBody.decode(&json!("text")).is_err());
}

#[test]
fn test_actions_remap_and_defaults() {
    let selector = RecordSelector::Custom(CustomExtraction::CampaignActions);
    let records = selector
        .decode(&json!({
            "actions": [{
                "id": "a1",
                "name": "Welcome",
                "from": "team@example.com",
                "from_id": 3,
                "extra": "dropped"
            }]
        }))
        .unwrap();

    assert_eq!(records.len(), 1);
    let action = &records[0];
    assert_eq!(action["from_email"], "team@example.com");
    assert!(!action.contains_key("from"));
    assert!(!action.contains_key("extra"));
    assert_eq!(action["subject"], "");
    assert_eq!(action["preheader_text"], "");
    assert_eq!(action["layout"], Value::Null);
    assert_eq!(action["from_id"], 3);
}

#[test]
fn test_actions_keep_present_subject() {
    let action = map_action(
        json!({"subject": "Hello", "preheader_text": null})
            .as_object()
            .unwrap()
            .clone(),
    );
    assert_eq!(action["subject"], "Hello");
    assert_eq!(action["preheader_text"], "");
}

#[test]
fn test_actions_absent() {
    let selector = RecordSelector::Custom(CustomExtraction::CampaignActions);
    assert!(selector.decode(&json!({})).unwrap().is_empty());
    assert!(selector.decode(&json!({"actions": []})).unwrap().is_empty());
}

#[test]
fn test_selector_describe() {
    assert_eq!(RecordSelector::WholeBody.describe(), "$");
    assert_eq!(RecordSelector::array_under("x").describe(), "$.x[*]");
    assert_eq!(
        RecordSelector::Custom(CustomExtraction::CampaignActions).describe(),
        "custom:campaign_actions"
    );
}
