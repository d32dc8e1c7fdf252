//! The declared stream set
//!
//! [`Catalog::customerio`] is the fixed Customer.io hierarchy:
//!
//! ```text
//! campaigns ─┬─ campaigns_metrics
//!            ├─ campaigns_actions
//!            └─ campaigns_messages
//! newsletters ── newsletters_metrics
//! segments
//! ```

use super::definition::{StreamDefinition, WindowParams};
use crate::decode::{CustomExtraction, RecordSelector};
use crate::error::{Error, Result};
use crate::pagination::PaginationConfig;
use crate::schema::{JsonType, SchemaProperty, StreamSchema};
use crate::template;
use std::collections::{BTreeSet, HashSet};

/// Page size for the messages endpoint
pub const MESSAGES_PAGE_SIZE: u32 = 1000;

/// Immutable, validated set of stream definitions in declared order
#[derive(Debug, Clone)]
pub struct Catalog {
    streams: Vec<StreamDefinition>,
}

impl Catalog {
    /// Validate and wrap a list of definitions
    ///
    /// Parents must be declared before their children, every parent must
    /// define a child context, and a child's path placeholders must be
    /// exactly the context keys it inherits.
    pub fn new(streams: Vec<StreamDefinition>) -> Result<Self> {
        let catalog = Self { streams };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The Customer.io stream hierarchy
    pub fn customerio() -> Result<Self> {
        Self::new(vec![
            campaigns(),
            campaigns_metrics(),
            campaigns_actions(),
            campaigns_messages(),
            newsletters(),
            newsletters_metrics(),
            segments(),
        ])
    }

    /// All streams in declared order
    pub fn streams(&self) -> &[StreamDefinition] {
        &self.streams
    }

    /// Look up a stream by name
    pub fn get(&self, name: &str) -> Option<&StreamDefinition> {
        self.streams.iter().find(|s| s.name == name)
    }

    /// Look up a stream, failing for unknown names
    pub fn require(&self, name: &str) -> Result<&StreamDefinition> {
        self.get(name).ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
    }

    /// Root streams in declared order
    pub fn roots(&self) -> impl Iterator<Item = &StreamDefinition> {
        self.streams.iter().filter(|s| s.is_root())
    }

    /// Direct children of a stream in declared order
    pub fn children_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a StreamDefinition> {
        self.streams
            .iter()
            .filter(move |s| s.parent.as_deref() == Some(name))
    }

    /// Stream names in declared order
    pub fn names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name.as_str()).collect()
    }

    /// Names of a stream's ancestors, nearest first
    pub fn ancestors_of(&self, name: &str) -> Vec<&str> {
        let mut ancestors = Vec::new();
        let mut current = self.get(name).and_then(|s| s.parent.as_deref());
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.get(parent).and_then(|s| s.parent.as_deref());
        }
        ancestors
    }

    /// Context keys a stream's records inherit from its parent chain
    pub fn inherited_keys(&self, name: &str) -> BTreeSet<String> {
        self.ancestors_of(name)
            .into_iter()
            .filter_map(|ancestor| self.get(ancestor))
            .filter_map(|ancestor| ancestor.child_context.as_ref())
            .map(|spec| spec.key.clone())
            .collect()
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for stream in &self.streams {
            if !seen.insert(stream.name.as_str()) {
                return Err(Error::config(format!(
                    "stream '{}' is declared twice",
                    stream.name
                )));
            }

            if let Some(parent_name) = &stream.parent {
                if !seen.contains(parent_name.as_str()) || parent_name == &stream.name {
                    return Err(Error::config(format!(
                        "stream '{}' must be declared after its parent '{parent_name}'",
                        stream.name
                    )));
                }
                let parent = self.require(parent_name)?;
                if parent.child_context.is_none() {
                    return Err(Error::config(format!(
                        "parent stream '{parent_name}' of '{}' defines no child context",
                        stream.name
                    )));
                }
            }

            let placeholders = template::variable_set(&stream.path);
            let inherited = self.inherited_keys(&stream.name);
            if placeholders != inherited {
                return Err(Error::config(format!(
                    "stream '{}' path placeholders {placeholders:?} do not match \
                     inherited context keys {inherited:?}",
                    stream.name
                )));
            }

            if !stream.schema.is_open() {
                if let Some(key) = inherited.iter().find(|k| !stream.schema.declares(k)) {
                    return Err(Error::config(format!(
                        "stream '{}' schema does not declare inherited field '{key}'",
                        stream.name
                    )));
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Customer.io streams
// ============================================================================

fn tags() -> SchemaProperty {
    SchemaProperty::array(SchemaProperty::string())
}

fn ids() -> SchemaProperty {
    SchemaProperty::array(SchemaProperty::integer())
}

fn campaigns() -> StreamDefinition {
    let schema = StreamSchema::new()
        .with_property("id", SchemaProperty::integer())
        .with_property("deduplicate_id", SchemaProperty::string())
        .with_property("name", SchemaProperty::string())
        .with_property("type", SchemaProperty::string())
        .with_property("created", SchemaProperty::integer())
        .with_property("updated", SchemaProperty::integer())
        .with_property("active", SchemaProperty::boolean())
        .with_property("state", SchemaProperty::string())
        .with_property(
            "actions",
            SchemaProperty::array(SchemaProperty::object([
                ("id", SchemaProperty::integer()),
                ("type", SchemaProperty::string()),
            ])),
        )
        .with_property("first_started", SchemaProperty::integer())
        .with_property("tags", tags())
        .with_property("created_by", SchemaProperty::string())
        .with_property(
            "msg_templates",
            SchemaProperty::array(SchemaProperty::object([
                ("id", SchemaProperty::integer()),
                ("type", SchemaProperty::string()),
            ])),
        )
        .with_property("trigger_segment_ids", ids())
        .with_property("filter_segment_ids", ids())
        .with_property("date_attribute", SchemaProperty::string())
        .with_property("timezone", SchemaProperty::string())
        .with_property("use_customer_timezone", SchemaProperty::boolean())
        .with_property("start_hour", SchemaProperty::integer())
        .with_property("start_minutes", SchemaProperty::integer())
        .with_property("frequency", SchemaProperty::string());

    StreamDefinition::new("campaigns", "/campaigns", schema)
        .with_primary_keys(&["id"])
        .with_selector(RecordSelector::array_under("campaigns"))
        .with_child_context("campaign_id", "id")
}

fn campaigns_metrics() -> StreamDefinition {
    let schema = StreamSchema::new()
        .with_property("campaign_id", SchemaProperty::integer())
        .with_property(
            "metric",
            SchemaProperty::object([("series", SchemaProperty::nullable(JsonType::Object))]),
        )
        .open();

    StreamDefinition::new("campaigns_metrics", "/campaigns/{campaign_id}/metrics", schema)
        .child_of("campaigns")
}

fn campaigns_actions() -> StreamDefinition {
    let schema = StreamSchema::new()
        .with_property("id", SchemaProperty::string())
        .with_property("campaign_id", SchemaProperty::integer())
        .with_property("parent_action_id", SchemaProperty::integer())
        .with_property("deduplicate_id", SchemaProperty::string())
        .with_property("name", SchemaProperty::string())
        .with_property("layout", SchemaProperty::string())
        .with_property("created", SchemaProperty::integer())
        .with_property("updated", SchemaProperty::integer())
        .with_property("body_amp", SchemaProperty::string())
        .with_property("language", SchemaProperty::string())
        .with_property("type", SchemaProperty::string())
        .with_property("sending_state", SchemaProperty::string())
        .with_property("from_email", SchemaProperty::string())
        .with_property("from_id", SchemaProperty::integer())
        .with_property("reply_to", SchemaProperty::string())
        .with_property("reply_to_id", SchemaProperty::integer())
        .with_property("preprocessor", SchemaProperty::string())
        .with_property("recipient", SchemaProperty::string())
        .with_property("subject", SchemaProperty::string())
        .with_property("bcc", SchemaProperty::string())
        .with_property("fake_bcc", SchemaProperty::boolean())
        .with_property("preheader_text", SchemaProperty::string());

    StreamDefinition::new("campaigns_actions", "/campaigns/{campaign_id}/actions", schema)
        .child_of("campaigns")
        .with_selector(RecordSelector::Custom(CustomExtraction::CampaignActions))
        .with_pagination(PaginationConfig::token())
}

fn campaigns_messages() -> StreamDefinition {
    let schema = StreamSchema::new()
        .with_property("id", SchemaProperty::string())
        .with_property("deduplicate_id", SchemaProperty::string())
        .with_property("msg_template_id", SchemaProperty::integer())
        .with_property("action_id", SchemaProperty::integer())
        .with_property("customer_id", SchemaProperty::string())
        .with_property(
            "customer_identifiers",
            SchemaProperty::object([
                ("id", SchemaProperty::string()),
                ("email", SchemaProperty::string()),
                ("cio_id", SchemaProperty::string()),
            ]),
        )
        .with_property("recipient", SchemaProperty::string())
        .with_property("subject", SchemaProperty::string())
        .with_property(
            "metrics",
            SchemaProperty::object([
                ("delivered", SchemaProperty::integer()),
                ("sent", SchemaProperty::integer()),
            ]),
        )
        .with_property("created", SchemaProperty::integer())
        .with_property("failure_message", SchemaProperty::string())
        .with_property("newsletter_id", SchemaProperty::string())
        .with_property("content_id", SchemaProperty::integer())
        .with_property("campaign_id", SchemaProperty::integer())
        .with_property("broadcast_id", SchemaProperty::string())
        .with_property("type", SchemaProperty::string())
        .with_property("forgotten", SchemaProperty::boolean());

    StreamDefinition::new("campaigns_messages", "/campaigns/{campaign_id}/messages", schema)
        .child_of("campaigns")
        .with_selector(RecordSelector::array_under("messages"))
        .with_pagination(PaginationConfig::window(MESSAGES_PAGE_SIZE))
        .with_window(WindowParams::Timestamps)
}

fn newsletters() -> StreamDefinition {
    let schema = StreamSchema::new()
        .with_property("id", SchemaProperty::integer())
        .with_property("deduplicate_id", SchemaProperty::string())
        .with_property("name", SchemaProperty::string())
        .with_property("type", SchemaProperty::string())
        .with_property("created", SchemaProperty::integer())
        .with_property("updated", SchemaProperty::integer())
        .with_property("sent_at", SchemaProperty::integer())
        .with_property("content_ids", ids())
        .with_property("tags", tags())
        .with_property("recipient_segment_ids", ids())
        .with_property("subscription_topic_id", SchemaProperty::integer());

    StreamDefinition::new("newsletters", "/newsletters", schema)
        .with_primary_keys(&["id"])
        .with_selector(RecordSelector::array_under("newsletters"))
        .with_child_context("newsletter_id", "id")
}

fn newsletters_metrics() -> StreamDefinition {
    let schema = StreamSchema::new()
        .with_property("newsletter_id", SchemaProperty::integer())
        .with_property(
            "metric",
            SchemaProperty::object([("series", SchemaProperty::nullable(JsonType::Object))]),
        )
        .open();

    StreamDefinition::new(
        "newsletters_metrics",
        "/newsletters/{newsletter_id}/metrics",
        schema,
    )
    .child_of("newsletters")
}

fn segments() -> StreamDefinition {
    let schema = StreamSchema::new()
        .with_property("id", SchemaProperty::integer())
        .with_property("deduplicate_id", SchemaProperty::string())
        .with_property("name", SchemaProperty::string())
        .with_property("description", SchemaProperty::string())
        .with_property("state", SchemaProperty::string())
        .with_property("progress", SchemaProperty::integer())
        .with_property("type", SchemaProperty::string())
        .with_property("tags", tags());

    StreamDefinition::new("segments", "/segments", schema)
        .with_primary_keys(&["id"])
        .with_selector(RecordSelector::array_under("segments"))
}
