//! Stream definitions and their per-stream functions
//!
//! A [`StreamDefinition`] is plain data. The four operations that give a
//! stream its behaviour (`build_request`, `parse_response`, `post_process`
//! and `derive_child_context`) are pure functions of that data plus their
//! arguments.

use super::context::Context;
use crate::decode::{RecordDecoder, RecordSelector};
use crate::error::{Error, Result};
use crate::pagination::{PageToken, PaginationConfig, Paginator};
use crate::schema::StreamSchema;
use crate::template;
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Query parameters of one request
pub type QueryParams = BTreeMap<String, String>;

/// A fully rendered request for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamRequest {
    /// Path relative to the API base URL
    pub path: String,
    /// Query parameters
    pub query: QueryParams,
}

impl StreamRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: QueryParams::new(),
        }
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Date window
// ============================================================================

/// Time bounds for streams that filter by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateWindow {
    /// Create a window, rejecting empty or inverted bounds
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(Error::invalid_value(
                "start_date",
                format!("window start {start} must be before end {end}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// The `days` days before `today`, from midnight to midnight (UTC)
    pub fn trailing_days(today: NaiveDate, days: u32) -> Result<Self> {
        let end = today.and_time(chrono::NaiveTime::MIN).and_utc();
        Self::new(Self::lookback(end, days)?, end)
    }

    /// `end` minus `days` days, failing when that falls outside the calendar
    pub fn lookback(end: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>> {
        end.checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| {
                Error::invalid_value(
                    "lookback_days",
                    format!("{days} days before {end} is out of range"),
                )
            })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Lower bound as unix seconds
    pub fn start_ts(&self) -> i64 {
        self.start.timestamp()
    }

    /// Upper bound as unix seconds
    pub fn end_ts(&self) -> i64 {
        self.end.timestamp()
    }
}

/// Whether a stream sends the run's date window with each request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowParams {
    #[default]
    None,
    /// `start_ts` / `end_ts` unix-second bounds
    Timestamps,
}

// ============================================================================
// Stream definition
// ============================================================================

/// How a parent record becomes a child context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildContextSpec {
    /// Context key (path placeholder) to bind
    pub key: String,
    /// Field of the parent record holding the value
    pub source_field: String,
}

/// Declarative description of one stream
#[derive(Debug, Clone)]
pub struct StreamDefinition {
    /// Stream name
    pub name: String,
    /// Path template, e.g. `/campaigns/{campaign_id}/metrics`
    pub path: String,
    /// Fields identifying a record (empty = append only)
    pub primary_keys: Vec<String>,
    /// Field used for ascending incremental ordering
    pub replication_key: Option<String>,
    /// Declared schema
    pub schema: StreamSchema,
    /// Parent stream name
    pub parent: Option<String>,
    /// Where records live in the response
    pub selector: RecordSelector,
    /// Pagination strategy
    pub pagination: PaginationConfig,
    /// Date window parameters
    pub window: WindowParams,
    /// Child context derivation, for streams with children
    pub child_context: Option<ChildContextSpec>,
}

impl StreamDefinition {
    /// Create a stream with single-page, whole-body defaults
    pub fn new(name: impl Into<String>, path: impl Into<String>, schema: StreamSchema) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            primary_keys: Vec::new(),
            replication_key: None,
            schema,
            parent: None,
            selector: RecordSelector::WholeBody,
            pagination: PaginationConfig::SinglePage,
            window: WindowParams::None,
            child_context: None,
        }
    }

    #[must_use]
    pub fn with_primary_keys(mut self, keys: &[&str]) -> Self {
        self.primary_keys = keys.iter().map(|k| (*k).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_replication_key(mut self, key: impl Into<String>) -> Self {
        self.replication_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: RecordSelector) -> Self {
        self.selector = selector;
        self
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: WindowParams) -> Self {
        self.window = window;
        self
    }

    /// Bind `key` in child contexts to the value of `source_field`
    #[must_use]
    pub fn with_child_context(
        mut self,
        key: impl Into<String>,
        source_field: impl Into<String>,
    ) -> Self {
        self.child_context = Some(ChildContextSpec {
            key: key.into(),
            source_field: source_field.into(),
        });
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Paginator for one run of this stream
    pub fn paginator(&self) -> Box<dyn Paginator> {
        self.pagination.build()
    }

    /// Render the request for one page
    ///
    /// `paginator` is the one driving this stream/context, normally from
    /// [`StreamDefinition::paginator`]. Parameters are merged in this order:
    /// paginator static params, date window, page token, replication ordering.
    pub fn build_request(
        &self,
        paginator: &dyn Paginator,
        context: &Context,
        page_token: Option<&PageToken>,
        window: &DateWindow,
    ) -> Result<StreamRequest> {
        let mut request = StreamRequest::new(template::render(&self.path, context)?);

        request.query.extend(paginator.initial_params());

        if self.window == WindowParams::Timestamps {
            request = request
                .query("start_ts", window.start_ts().to_string())
                .query("end_ts", window.end_ts().to_string());
        }

        if let Some(token) = page_token {
            request.query.extend(paginator.token_params(token));
        }

        if let Some(key) = &self.replication_key {
            request = request.query("sort", "asc").query("order_by", key.as_str());
        }

        Ok(request)
    }

    /// Extract raw records from one response body
    pub fn parse_response(&self, body: &JsonValue) -> Result<Vec<JsonObject>> {
        self.selector.decode(body)
    }

    /// Stamp inherited context fields onto a record
    ///
    /// Returns `None` to suppress the record. A context binding without a
    /// value cannot be stamped, so such records are suppressed rather than
    /// emitted without their lineage.
    pub fn post_process(&self, mut record: JsonObject, context: &Context) -> Option<JsonObject> {
        for (key, value) in context.iter() {
            if value.is_null() {
                return None;
            }
            record.insert(key.clone(), value.clone());
        }
        Some(record)
    }

    /// Derive the context for this stream's children from one of its records
    pub fn derive_child_context(&self, record: &JsonObject, parent: &Context) -> Result<Context> {
        let spec = self.child_context.as_ref().ok_or_else(|| {
            Error::config(format!(
                "stream '{}' has children but no child context",
                self.name
            ))
        })?;

        match record.get(&spec.source_field) {
            Some(value @ (JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_))) => {
                Ok(parent.clone().with_value(spec.key.clone(), value.clone()))
            }
            _ => Err(Error::missing_context_key(&self.name, &spec.source_field)),
        }
    }
}
