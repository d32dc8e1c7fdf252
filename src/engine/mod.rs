//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Drives every stream/context pair depth first
//! - `SyncConfig` - Configuration for sync operations
//! - `Message` / `MessageSink` - Output seam for schemas and records
//!
//! Each (stream, context) pair paginates until its paginator yields no
//! token. Every record is coerced, stamped with its context and emitted
//! before the children it spawns are driven, so a parent record always
//! precedes its descendants in the output.

mod types;

pub use types::{Message, MessageSink, SyncConfig, SyncStats, DEFAULT_MAX_PAGES};

use crate::error::Result;
use crate::http::Fetcher;
use crate::pagination::PaginationState;
use crate::schema::coerce_record;
use crate::stream::{Catalog, Context, StreamDefinition};
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// Page source
    fetcher: Arc<dyn Fetcher>,
    /// Stream declarations
    catalog: Catalog,
    /// Sync configuration
    config: SyncConfig,
    /// Statistics of the last run
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(fetcher: Arc<dyn Fetcher>, catalog: Catalog, config: SyncConfig) -> Self {
        Self {
            fetcher,
            catalog,
            config,
            stats: SyncStats::default(),
        }
    }

    /// Get the catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Streams that emit records and streams that must be traversed.
    ///
    /// The traversal set is the selection plus every ancestor of a selected
    /// stream.
    pub fn plan(&self) -> Result<SyncPlan> {
        let emit: BTreeSet<String> = match &self.config.selected {
            Some(selected) => {
                for name in selected {
                    self.catalog.require(name)?;
                }
                selected.clone()
            }
            None => self.catalog.names().into_iter().map(String::from).collect(),
        };

        let mut visit = emit.clone();
        for name in &emit {
            visit.extend(self.catalog.ancestors_of(name).into_iter().map(String::from));
        }

        Ok(SyncPlan { emit, visit })
    }

    /// Run a full sync, sending every message to `sink`
    pub async fn run(&mut self, sink: &mut dyn MessageSink) -> Result<SyncStats> {
        let start = Instant::now();
        let plan = self.plan()?;

        info!(
            streams = plan.emit.len(),
            window_start = %self.config.window.start(),
            window_end = %self.config.window.end(),
            "Starting sync"
        );

        for stream in self.catalog.streams() {
            if plan.emits(&stream.name) {
                sink.emit(Message::schema(stream))?;
            }
        }

        let mut traversal = Traversal {
            fetcher: self.fetcher.as_ref(),
            catalog: &self.catalog,
            config: &self.config,
            plan: &plan,
            sink,
            stats: SyncStats::default(),
            seen: BTreeSet::new(),
        };

        let roots: Vec<&StreamDefinition> = self
            .catalog
            .roots()
            .filter(|s| plan.visits(&s.name))
            .collect();
        for root in roots {
            traversal.sync_stream(root, Context::new()).await?;
        }

        let mut stats = traversal.stats;
        #[allow(clippy::cast_possible_truncation)]
        stats.set_duration(start.elapsed().as_millis() as u64);

        info!(
            records = stats.records_emitted,
            suppressed = stats.records_suppressed,
            pages = stats.pages_fetched,
            contexts = stats.contexts_synced,
            violations = stats.schema_violations,
            duration_ms = stats.duration_ms,
            "Completed sync"
        );

        self.stats = stats.clone();
        Ok(stats)
    }
}

/// Which streams a run emits and which it walks through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    emit: BTreeSet<String>,
    visit: BTreeSet<String>,
}

impl SyncPlan {
    /// Records of this stream reach the sink
    pub fn emits(&self, stream: &str) -> bool {
        self.emit.contains(stream)
    }

    /// This stream is fetched (emitting or not)
    pub fn visits(&self, stream: &str) -> bool {
        self.visit.contains(stream)
    }
}

/// State of one run
struct Traversal<'a> {
    fetcher: &'a dyn Fetcher,
    catalog: &'a Catalog,
    config: &'a SyncConfig,
    plan: &'a SyncPlan,
    sink: &'a mut dyn MessageSink,
    stats: SyncStats,
    seen: BTreeSet<&'a str>,
}

impl<'a> Traversal<'a> {
    /// Drive one stream/context pair to exhaustion, children included
    fn sync_stream(
        &mut self,
        stream: &'a StreamDefinition,
        context: Context,
    ) -> BoxFuture<'_, Result<()>> {
        async move {
            self.sync_pages(stream, &context)
                .await
                .map_err(|e| e.in_stream(&stream.name, context.to_string()))
        }
        .boxed()
    }

    async fn sync_pages(&mut self, stream: &'a StreamDefinition, context: &Context) -> Result<()> {
        let emit = self.plan.emits(&stream.name);
        let children: Vec<&'a StreamDefinition> = self
            .catalog
            .children_of(&stream.name)
            .filter(|child| self.plan.visits(&child.name))
            .collect();

        if self.seen.insert(&stream.name) {
            self.stats.add_stream();
        }

        debug!(stream = %stream.name, context = %context, emit, "Syncing stream context");

        let paginator = stream.paginator();
        let mut state = PaginationState::new();

        loop {
            let request = stream.build_request(
                paginator.as_ref(),
                context,
                state.token.as_ref(),
                &self.config.window,
            )?;
            debug!(
                stream = %stream.name,
                path = %request.path,
                page = state.page + 1,
                "Fetching page"
            );

            let body = self.fetcher.fetch(&request).await?;
            state.record_page();
            self.stats.add_page();

            let records = stream.parse_response(&body)?;
            debug!(stream = %stream.name, records = records.len(), "Parsed page");

            for raw in records {
                let coerced = coerce_record(raw, &stream.schema);
                for violation in &coerced.violations {
                    warn!(
                        stream = %stream.name,
                        context = %context,
                        "Schema violation: {violation}"
                    );
                }
                self.stats.add_violations(coerced.violations.len());

                let Some(record) = stream.post_process(coerced.record, context) else {
                    debug!(stream = %stream.name, "Suppressed record with null context binding");
                    self.stats.add_suppressed();
                    continue;
                };

                let child_context =
                    (!children.is_empty()).then(|| stream.derive_child_context(&record, context));

                if emit {
                    self.sink.emit(Message::record(&stream.name, record))?;
                    self.stats.add_record();
                }

                if let Some(child_context) = child_context {
                    let child_context = child_context?;
                    for &child in &children {
                        self.sync_stream(child, child_context.clone()).await?;
                    }
                }
            }

            state.advance(paginator.next_token(&body), self.config.max_pages)?;
            if state.done {
                break;
            }
        }

        self.stats.add_context();
        debug!(stream = %stream.name, context = %context, pages = state.page, "Context exhausted");
        Ok(())
    }
}
