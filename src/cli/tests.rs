//! Tests for the CLI

use super::*;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("tap-customerio").chain(args.iter().copied())).unwrap()
}

async fn run(args: &[&str]) -> (crate::error::Result<()>, Vec<Value>) {
    let mut out = Vec::new();
    let result = Runner::new(parse(args)).run_to(&mut out).await;
    let lines = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (result, lines)
}

fn inline_config(server: &MockServer) -> String {
    json!({"auth_token": "secret", "base_url": server.uri(), "max_retries": 0}).to_string()
}

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn test_parse_read_with_streams() {
    let cli = parse(&["read", "--streams", "campaigns,segments", "--max-pages", "5"]);
    assert_eq!(
        cli.command,
        Commands::Read {
            streams: vec!["campaigns".to_string(), "segments".to_string()],
            max_pages: Some(5),
        }
    );
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = parse(&["check", "--config", "tap.yaml", "-v"]);
    assert_eq!(cli.command, Commands::Check);
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("tap.yaml")));
    assert!(cli.verbose);
}

#[test]
fn test_parse_rejects_unknown_command() {
    assert!(Cli::try_parse_from(["tap-customerio", "serve"]).is_err());
}

// ============================================================================
// Commands
// ============================================================================

#[tokio::test]
async fn test_spec_command() {
    let (result, lines) = run(&["spec"]).await;
    result.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["type"], "SPEC");
    assert_eq!(lines[0]["spec"]["required"], json!(["auth_token"]));
}

#[tokio::test]
async fn test_streams_command() {
    let (result, lines) = run(&["streams"]).await;
    result.unwrap();

    let names: Vec<&str> = lines[0]["streams"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 7);
    assert_eq!(names[0], "campaigns");
    assert_eq!(lines[0]["streams"][1]["parent"], "campaigns");
    assert_eq!(lines[0]["streams"][0]["parent"], Value::Null);
}

#[tokio::test]
async fn test_discover_command() {
    let (result, lines) = run(&["discover"]).await;
    result.unwrap();

    let streams = lines[0]["catalog"]["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 7);
    let segments = streams.iter().find(|s| s["stream"] == "segments").unwrap();
    assert_eq!(segments["key_properties"], json!(["id"]));
    assert_eq!(segments["schema"]["type"], "object");
}

#[tokio::test]
async fn test_check_command_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"campaigns": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = inline_config(&server);
    let (result, lines) = run(&["check", "--config-json", &config]).await;
    result.unwrap();
    assert_eq!(lines[0]["connectionStatus"]["status"], "SUCCEEDED");
}

#[tokio::test]
async fn test_check_command_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = inline_config(&server);
    let (result, lines) = run(&["check", "--config-json", &config]).await;
    result.unwrap();
    assert_eq!(lines[0]["connectionStatus"]["status"], "FAILED");
}

#[tokio::test]
async fn test_read_requires_config() {
    let (result, lines) = run(&["read"]).await;
    assert!(result.is_err());
    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_read_selected_stream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/segments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"segments": [{"id": 1, "name": "vip"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = inline_config(&server);
    let (result, lines) = run(&["read", "--streams", "segments", "--config-json", &config]).await;
    result.unwrap();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["type"], "SCHEMA");
    assert_eq!(
        lines[1],
        json!({"type": "RECORD", "stream": "segments", "record": {"id": 1, "name": "vip"}})
    );
}

#[tokio::test]
async fn test_read_rejects_zero_max_pages() {
    let server = MockServer::start().await;
    let config = inline_config(&server);
    let (result, _) = run(&["read", "--max-pages", "0", "--config-json", &config]).await;
    assert!(matches!(
        result,
        Err(crate::error::Error::InvalidConfigValue { .. })
    ));
}
