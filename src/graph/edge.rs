//! Ordering edges between events

use crate::model::Event;
use serde::{Deserialize, Serialize};

/// Unique identifier for an edge
///
/// Serializes as a plain string of the form `E<source id_num>-E<target id_num>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Id for an edge between two event sequence numbers
    pub fn between(source_num: u32, target_num: u32) -> Self {
        Self(format!("E{}-E{}", source_num, target_num))
    }

    /// Create an EdgeId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed ordering constraint: `source` happens before `target`.
///
/// Endpoints are event texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: String,
}

impl Edge {
    /// Create an edge from `source` to `target`
    pub fn new(source: &Event, target: &Event) -> Self {
        Self {
            id: EdgeId::between(source.id_num, target.id_num),
            source: source.event_text.clone(),
            target: target.event_text.clone(),
            label: String::new(),
        }
    }

    /// Exact directional match
    pub fn is(&self, source: &str, target: &str) -> bool {
        self.source == source && self.target == target
    }

    /// Whether either endpoint is `event_text`
    pub fn touches(&self, event_text: &str) -> bool {
        self.source == event_text || self.target == event_text
    }
}
