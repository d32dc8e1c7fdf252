//! Tests for the HTTP transport

use super::*;
use crate::error::Error;
use crate::stream::StreamRequest;
use crate::types::BackoffType;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, max_retries: u32) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .auth_token("test-token")
        .max_retries(max_retries)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

async fn fetch(client: &HttpClient, path: &str) -> crate::error::Result<serde_json::Value> {
    client.fetch(&StreamRequest::new(path)).await
}

fn policy(backoff_type: BackoffType, max: Duration) -> RetryPolicy {
    RetryPolicy {
        backoff_type,
        initial_backoff: Duration::from_millis(100),
        max_backoff: max,
        ..RetryPolicy::default()
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_defaults_target_app_api() {
    let config = HttpClientConfig::default();
    assert_eq!(config.base_url, "https://api.customer.io/v1");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.retry, RetryPolicy::default());
    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::per_second(10)));
    assert!(config.auth_token.is_none());
    assert!(config.user_agent.starts_with("tap-customerio/"));
}

#[test]
fn test_builder_sets_retry_policy() {
    let config = HttpClientConfig::builder()
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .build();

    assert_eq!(
        config.retry,
        RetryPolicy {
            max_retries: 5,
            backoff_type: BackoffType::Linear,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(30),
        }
    );
}

#[test]
fn test_config_debug_redacts_token() {
    let config = HttpClientConfig::builder().auth_token("super-secret").build();
    let debug = format!("{config:?}");
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("***"));
}

// ============================================================================
// Fetching
// ============================================================================

#[tokio::test]
async fn test_fetch_sends_bearer_query_and_parses_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns/1/messages"))
        .and(header("Authorization", "Bearer test-token"))
        .and(query_param("limit", "1000"))
        .and(query_param("start", "tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{"id": "m1"}],
            "next": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = StreamRequest::new("/campaigns/1/messages")
        .query("limit", "1000")
        .query("start", "tok123");
    let body = client_for(&server, 0).fetch(&request).await.unwrap();

    assert_eq!(body, json!({"messages": [{"id": "m1"}], "next": ""}));
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/newsletters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"newsletters": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(format!("{}/v1/", server.uri()))
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert_eq!(
        fetch(&client, "/newsletters").await.unwrap(),
        json!({"newsletters": []})
    );
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = fetch(&client_for(&server, 0), "/segments")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { ref message } if message.contains("/segments")));
    assert!(!err.is_transport());
}

// ============================================================================
// Retries
// ============================================================================

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns/9/metrics"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetch(&client_for(&server, 3), "/campaigns/9/metrics")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, ref body } if body == "Not found"));
}

#[tokio::test]
async fn test_unauthorized_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetch(&client_for(&server, 3), "/campaigns")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 401, .. }));
}

#[tokio::test]
async fn test_transient_5xx_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"campaigns": []})))
        .expect(1)
        .mount(&server)
        .await;

    let body = fetch(&client_for(&server, 3), "/campaigns").await.unwrap();
    assert_eq!(body, json!({"campaigns": []}));
}

#[tokio::test]
async fn test_exhausted_retries_return_last_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(3)
        .mount(&server)
        .await;

    let err = fetch(&client_for(&server, 2), "/campaigns")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, ref body } if body == "down"));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_throttling_waits_for_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"campaigns": []})))
        .mount(&server)
        .await;

    let started = Instant::now();
    fetch(&client_for(&server, 1), "/campaigns").await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_throttled_after_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let err = fetch(&client_for(&server, 1), "/campaigns")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 0
        }
    ));
}

// ============================================================================
// Backoff
// ============================================================================

#[test]
fn test_constant_backoff() {
    let policy = policy(BackoffType::Constant, Duration::from_secs(10));
    assert_eq!(policy.delay(0), Duration::from_millis(100));
    assert_eq!(policy.delay(5), Duration::from_millis(100));
}

#[test]
fn test_linear_backoff() {
    let policy = policy(BackoffType::Linear, Duration::from_secs(10));
    assert_eq!(policy.delay(0), Duration::from_millis(100));
    assert_eq!(policy.delay(1), Duration::from_millis(200));
    assert_eq!(policy.delay(2), Duration::from_millis(300));
}

#[test]
fn test_exponential_backoff_is_capped() {
    let policy = policy(BackoffType::Exponential, Duration::from_millis(500));
    assert_eq!(policy.delay(0), Duration::from_millis(100));
    assert_eq!(policy.delay(1), Duration::from_millis(200));
    assert_eq!(policy.delay(2), Duration::from_millis(400));
    assert_eq!(policy.delay(3), Duration::from_millis(500));
    assert_eq!(policy.delay(40), Duration::from_millis(500));
}

// ============================================================================
// Rate limiter
// ============================================================================

#[test]
fn test_rate_limiter_config() {
    assert_eq!(RateLimiterConfig::default(), RateLimiterConfig::new(10, 10));
    assert_eq!(RateLimiterConfig::per_second(3).burst_size, 3);
}

#[tokio::test]
async fn test_rate_limiter_zero_is_clamped() {
    let limiter = RateLimiter::new(&RateLimiterConfig::new(0, 0));
    tokio::time::timeout(Duration::from_secs(1), limiter.wait())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_client_requests_are_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/segments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"segments": []})))
        .expect(3)
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .rate_limit(RateLimiterConfig::new(5, 1))
        .build();
    let client = HttpClient::with_config(config).unwrap();

    // Burst of one at 5/s: the second and third requests wait ~200ms each
    let started = Instant::now();
    for _ in 0..3 {
        fetch(&client, "/segments").await.unwrap();
    }
    assert!(started.elapsed() >= Duration::from_millis(300));
}
