//! Response decoder module
//!
//! Supports: whole body, array under a key, custom per-stream extraction
//!
//! # Overview
//!
//! Each stream declares a `RecordSelector`. The selector turns a JSON
//! response body into the raw record objects for that page; schema coercion
//! and context stamping happen afterwards in the engine.

mod decoders;
mod types;

pub use decoders::map_action;
pub use types::{CustomExtraction, RecordDecoder, RecordSelector};

#[cfg(test)]
mod tests;
