//! Audit trail of user actions, submitted alongside the schema

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Kind of tracked action; serialized as the entry's `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingKind {
    AddEvent,
    DeleteEvent,
    EditEvent,
    ReorderEvent,
    Gpt2SuggestionInput,
    Gpt2SuggestionOutput,
    Gpt2SuggestionSelect,
}

/// One row of the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEntry {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TrackingKind,
    pub data: Value,
}

impl TrackingEntry {
    fn now(kind: TrackingKind, data: Value) -> Self {
        Self {
            date: Utc::now(),
            kind,
            data,
        }
    }

    pub fn add_event(event_text: &str) -> Self {
        Self::now(TrackingKind::AddEvent, json!(event_text))
    }

    pub fn delete_event(event_text: &str) -> Self {
        Self::now(TrackingKind::DeleteEvent, json!(event_text))
    }

    pub fn edit_event(old_text: &str, new_text: &str) -> Self {
        Self::now(
            TrackingKind::EditEvent,
            json!({ "old_text": old_text, "new_text": new_text }),
        )
    }

    pub fn reorder_event(old_index: usize, new_index: usize) -> Self {
        Self::now(
            TrackingKind::ReorderEvent,
            json!({ "old_index": old_index, "new_index": new_index }),
        )
    }

    pub fn suggestion_input(input: Value, mode: &str) -> Self {
        Self::now(
            TrackingKind::Gpt2SuggestionInput,
            json!({ "input": input, "mode": mode }),
        )
    }

    pub fn suggestion_output(suggestions: &[String]) -> Self {
        Self::now(TrackingKind::Gpt2SuggestionOutput, json!(suggestions))
    }

    pub fn suggestion_select(event_text: &str) -> Self {
        Self::now(TrackingKind::Gpt2SuggestionSelect, json!(event_text))
    }
}
