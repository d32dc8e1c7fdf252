//! Stream module
//!
//! Data-driven stream declarations and the per-stream operations.
//!
//! # Overview
//!
//! - `StreamDefinition` - immutable description of one endpoint
//! - `Context` - bindings derived from a parent record
//! - `Catalog` - validated, ordered set of definitions
//! - `DateWindow` - time bounds for windowed endpoints

mod catalog;
mod context;
mod definition;

pub use catalog::{Catalog, MESSAGES_PAGE_SIZE};
pub use context::Context;
pub use definition::{
    ChildContextSpec, DateWindow, QueryParams, StreamDefinition, StreamRequest, WindowParams,
};
