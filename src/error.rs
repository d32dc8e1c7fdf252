//! Error types for tap-customerio
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for tap-customerio
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to extract records from '{selector}': {message}")]
    RecordExtraction { selector: String, message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Stream Hierarchy Errors
    // ============================================================================
    #[error("Stream '{stream}' not found in catalog")]
    StreamNotFound { stream: String },

    #[error("Parent record for stream '{stream}' has no usable '{key}' field")]
    MissingContextKey { stream: String, key: String },

    #[error("Pagination exceeded {max_pages} pages")]
    PageLimitExceeded { max_pages: u32 },

    #[error("Server returned page token '{token}' twice in a row")]
    RepeatedPageToken { token: String },

    #[error("Stream '{stream}' failed for context {context}: {source}")]
    Stream {
        stream: String,
        context: String,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Undefined variable in path template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a record extraction error
    pub fn extraction(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordExtraction {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create a missing context key error
    pub fn missing_context_key(stream: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingContextKey {
            stream: stream.into(),
            key: key.into(),
        }
    }

    /// Attach the failing stream/context pair.
    ///
    /// Errors that already carry a stream are returned unchanged so the
    /// innermost failing pair is the one reported.
    pub fn in_stream(self, stream: impl Into<String>, context: impl Into<String>) -> Self {
        match self {
            Error::Stream { .. } => self,
            other => Self::Stream {
                stream: stream.into(),
                context: context.into(),
                source: Box::new(other),
            },
        }
    }

    /// Check if this is a transport-level failure
    pub fn is_transport(&self) -> bool {
        match self {
            Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::RateLimited { .. }
            | Error::Timeout { .. } => true,
            Error::Stream { source, .. } => source.is_transport(),
            _ => false,
        }
    }
}

/// Result type alias for tap-customerio
pub type Result<T> = std::result::Result<T, Error>;
