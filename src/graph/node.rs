//! Graph nodes derived from events

use crate::model::Event;
use serde::{Deserialize, Serialize};

/// A node of the ordering graph; its id is the event text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl From<&Event> for GraphNode {
    fn from(event: &Event) -> Self {
        Self {
            id: event.event_text.clone(),
            label: event.id.clone(),
        }
    }
}
