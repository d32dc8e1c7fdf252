//! Tests for pagination module

use super::*;
use crate::error::Error;
use serde_json::json;
use test_case::test_case;

// ============================================================================
// Token extraction
// ============================================================================

#[test_case(json!({"next": "tok123"}), Some("tok123") ; "string token")]
#[test_case(json!({"next": 1000}), Some("1000") ; "numeric token")]
#[test_case(json!({"next": ""}), None ; "empty token")]
#[test_case(json!({"next": null}), None ; "null token")]
#[test_case(json!({"messages": []}), None ; "absent token")]
fn test_extract_token(body: serde_json::Value, expected: Option<&str>) {
    assert_eq!(
        extract_token(&body, "next"),
        expected.map(PageToken::new)
    );
}

#[test]
fn test_extract_nested_token() {
    let body = json!({"meta": {"next": "abc"}});
    assert_eq!(extract_token(&body, "$.meta.next"), Some(PageToken::new("abc")));
    assert_eq!(extract_token(&body, "meta.missing"), None);
}

// ============================================================================
// Strategies
// ============================================================================

#[test]
fn test_token_paginator() {
    let paginator = TokenPaginator::default();
    assert!(paginator.initial_params().is_empty());

    let token = paginator.next_token(&json!({"next": "tok123"})).unwrap();
    let params = paginator.token_params(&token);
    assert_eq!(params.get("start"), Some(&"tok123".to_string()));

    assert!(paginator.next_token(&json!({})).is_none());
}

#[test]
fn test_window_paginator() {
    let paginator = WindowPaginator::new("next", "start", "limit", 1000);
    assert_eq!(
        paginator.initial_params().get("limit"),
        Some(&"1000".to_string())
    );

    let token = paginator.next_token(&json!({"next": "p2"})).unwrap();
    assert_eq!(
        paginator.token_params(&token).get("start"),
        Some(&"p2".to_string())
    );
    assert!(paginator.next_token(&json!({"next": null})).is_none());
}

#[test]
fn test_single_page_paginator() {
    let paginator = SinglePagePaginator;
    assert!(paginator.initial_params().is_empty());
    assert!(paginator.next_token(&json!({"next": "ignored"})).is_none());
    assert!(paginator
        .token_params(&PageToken::new("x"))
        .is_empty());
}

#[test]
fn test_next_token_is_pure() {
    let paginator = TokenPaginator::default();
    let body = json!({"next": "same"});
    assert_eq!(paginator.next_token(&body), paginator.next_token(&body));
}

#[test]
fn test_config_build() {
    let body = json!({"next": "t"});
    assert!(PaginationConfig::SinglePage.build().next_token(&body).is_none());
    assert!(PaginationConfig::token().build().next_token(&body).is_some());

    let window = PaginationConfig::window(50).build();
    assert_eq!(window.initial_params().get("limit"), Some(&"50".to_string()));
    assert_eq!(PaginationConfig::default(), PaginationConfig::SinglePage);
}

// ============================================================================
// PaginationState
// ============================================================================

#[test]
fn test_state_default() {
    let state = PaginationState::new();
    assert_eq!(state.page, 0);
    assert!(state.token.is_none());
    assert!(!state.done);
}

#[test]
fn test_state_advance_until_done() {
    let mut state = PaginationState::new();

    state.record_page();
    state.advance(Some(PageToken::new("a")), 10).unwrap();
    assert_eq!(state.token, Some(PageToken::new("a")));
    assert!(!state.done);

    state.record_page();
    state.advance(None, 10).unwrap();
    assert!(state.done);
    assert!(state.token.is_none());
    assert_eq!(state.page, 2);
}

#[test]
fn test_state_page_ceiling() {
    let mut state = PaginationState::new();
    state.record_page();
    state.advance(Some(PageToken::new("a")), 2).unwrap();
    state.record_page();

    let err = state.advance(Some(PageToken::new("b")), 2).unwrap_err();
    assert!(matches!(err, Error::PageLimitExceeded { max_pages: 2 }));
}

#[test]
fn test_state_ceiling_allows_final_page() {
    let mut state = PaginationState::new();
    state.record_page();
    state.advance(Some(PageToken::new("a")), 2).unwrap();
    state.record_page();
    state.advance(None, 2).unwrap();
    assert!(state.done);
}

#[test]
fn test_state_repeated_token() {
    let mut state = PaginationState::new();
    state.record_page();
    state.advance(Some(PageToken::new("same")), 100).unwrap();
    state.record_page();

    let err = state.advance(Some(PageToken::new("same")), 100).unwrap_err();
    assert!(matches!(err, Error::RepeatedPageToken { .. }));
}
