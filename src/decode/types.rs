//! Decoder types and traits
//!
//! Defines how raw records are located in a response body.

use crate::error::Result;
use crate::types::{JsonObject, JsonValue};

/// Where the records of a stream live in the response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSelector {
    /// The body itself: one record for an object, one per element for an array
    WholeBody,
    /// Each element of the array under a top-level key
    ArrayUnderKey(String),
    /// Stream-specific extraction with field remapping
    Custom(CustomExtraction),
}

impl RecordSelector {
    /// Select the array under `key`
    pub fn array_under(key: impl Into<String>) -> Self {
        Self::ArrayUnderKey(key.into())
    }

    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Self::WholeBody => "$".to_string(),
            Self::ArrayUnderKey(key) => format!("$.{key}[*]"),
            Self::Custom(custom) => format!("custom:{}", custom.name()),
        }
    }
}

/// Extraction functions for streams whose records need remapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomExtraction {
    /// `actions` array; `from` becomes `from_email`, text fields default to ""
    CampaignActions,
}

impl CustomExtraction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CampaignActions => "campaign_actions",
        }
    }
}

/// Trait for extracting raw records from a response body
pub trait RecordDecoder: Send + Sync {
    /// Decode the response body into a list of raw records
    fn decode(&self, body: &JsonValue) -> Result<Vec<JsonObject>>;
}
