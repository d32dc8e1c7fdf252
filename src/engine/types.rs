//! Engine types
//!
//! Message types, sinks and configuration for the sync engine.

use crate::error::Result;
use crate::stream::{DateWindow, StreamDefinition};
use crate::types::{JsonObject, JsonValue};
use serde::Serialize;
use std::collections::BTreeSet;

/// A message emitted during sync
///
/// Serializes to the Singer wire shape (`{"type": "RECORD", ...}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Schema descriptor, sent once per selected stream before its records
    #[serde(rename = "SCHEMA")]
    Schema {
        /// Stream name
        stream: String,
        /// JSON schema of the stream's records
        schema: JsonValue,
        /// Primary key fields
        key_properties: Vec<String>,
        /// Replication key fields
        bookmark_properties: Vec<String>,
    },
    /// A single coerced, context-stamped record
    #[serde(rename = "RECORD")]
    Record {
        /// Stream name
        stream: String,
        /// The record
        record: JsonObject,
    },
}

impl Message {
    /// Create the schema message for a stream
    pub fn schema(stream: &StreamDefinition) -> Self {
        Self::Schema {
            stream: stream.name.clone(),
            schema: stream.schema.to_json(),
            key_properties: stream.primary_keys.clone(),
            bookmark_properties: stream.replication_key.iter().cloned().collect(),
        }
    }

    /// Create a record message
    pub fn record(stream: impl Into<String>, record: JsonObject) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
        }
    }

    /// Stream this message belongs to
    pub fn stream(&self) -> &str {
        match self {
            Self::Schema { stream, .. } | Self::Record { stream, .. } => stream,
        }
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a schema message
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

/// Destination for emitted messages
pub trait MessageSink: Send {
    /// Accept one message
    fn emit(&mut self, message: Message) -> Result<()>;
}

impl MessageSink for Vec<Message> {
    fn emit(&mut self, message: Message) -> Result<()> {
        self.push(message);
        Ok(())
    }
}

/// Default page ceiling per stream/context pair
pub const DEFAULT_MAX_PAGES: u32 = 10_000;

/// Configuration for sync operation
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Page ceiling per stream/context pair
    pub max_pages: u32,
    /// Streams to emit; `None` emits every stream
    pub selected: Option<BTreeSet<String>>,
    /// Time bounds for windowed endpoints
    pub window: DateWindow,
}

impl SyncConfig {
    /// Create a new sync config for the given window
    pub fn new(window: DateWindow) -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            selected: None,
            window,
        }
    }

    /// Set the page ceiling
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Restrict emission to the named streams
    #[must_use]
    pub fn with_selected<I, S>(mut self, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = Some(streams.into_iter().map(Into::into).collect());
        self
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Records sent to the sink
    pub records_emitted: usize,
    /// Records dropped because a context binding was null
    pub records_suppressed: usize,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Stream/context pairs driven to exhaustion
    pub contexts_synced: usize,
    /// Fields nulled by schema coercion
    pub schema_violations: usize,
    /// Streams with at least one context synced
    pub streams_synced: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an emitted record
    pub fn add_record(&mut self) {
        self.records_emitted += 1;
    }

    /// Count a suppressed record
    pub fn add_suppressed(&mut self) {
        self.records_suppressed += 1;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a finished context
    pub fn add_context(&mut self) {
        self.contexts_synced += 1;
    }

    /// Add schema violations
    pub fn add_violations(&mut self, count: usize) {
        self.schema_violations += count;
    }

    /// Add a stream
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
