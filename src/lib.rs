// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tap-customerio
//!
//! Incremental multi-stream extractor for the Customer.io App API.
//!
//! ## Features
//!
//! - **Stream Hierarchy**: Parent records spawn child streams with inherited context
//! - **Token Pagination**: `next`/`start` continuation with page ceilings
//! - **Schema Coercion**: Records are shaped to declared JSON schemas
//! - **Singer Output**: SCHEMA and RECORD messages as JSON lines
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tap_customerio::{Catalog, HttpClient, SyncConfig, SyncEngine, TapConfig};
//!
//! #[tokio::main]
//! async fn main() -> tap_customerio::Result<()> {
//!     let config = TapConfig::from_file("tap.yaml")?;
//!     let client = HttpClient::with_config(config.http_config())?;
//!     let sync = SyncConfig::new(config.date_window()?).with_selected(["campaigns"]);
//!
//!     let mut engine = SyncEngine::new(Arc::new(client), Catalog::customerio()?, sync);
//!     let mut messages = Vec::new();
//!     let stats = engine.run(&mut messages).await?;
//!     println!("{} records", stats.records_emitted);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         SyncEngine                              │
//! │  roots → pages → records → child contexts → children (DFS)      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   HTTP   │  Stream   │   Paginate    │  Decode   │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Bearer   │ Catalog   │ Token         │ Whole body│ JSON lines  │
//! │ Retry    │ Context   │ Window        │ Array key │             │
//! │ Rate Lim │ Template  │ Single page   │ Actions   │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Record extraction from response bodies
pub mod decode;

/// Stream schemas and record coercion
pub mod schema;

/// Path template rendering
pub mod template;

/// Stream definitions, contexts and the catalog
pub mod stream;

/// Main execution engine
pub mod engine;

/// JSON lines output
pub mod output;

/// Tap configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::TapConfig;
pub use engine::{Message, MessageSink, SyncConfig, SyncEngine, SyncStats};
pub use error::{Error, Result};
pub use http::{Fetcher, HttpClient, HttpClientConfig};
pub use output::JsonLinesSink;
pub use stream::{Catalog, Context, DateWindow, StreamDefinition, StreamRequest};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
