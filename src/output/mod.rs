//! Output module
//!
//! Serializes engine messages for downstream loaders.
//!
//! # Overview
//!
//! - `JsonLinesSink` - one Singer-style JSON message per line

mod writer;

pub use writer::JsonLinesSink;
