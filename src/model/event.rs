//! Events and their argument slots

use super::primitive::EventPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

/// Longest event text shown in full in a display id
const DISPLAY_TEXT_MAX: usize = 25;
/// Characters kept when a display id is abbreviated
const DISPLAY_TEXT_KEEP: usize = 22;

/// Comparison key for event text uniqueness.
///
/// Spaces map to hyphens and case is ignored, so "Buy Car", "buy-car" and
/// "buy car" all collide.
pub fn event_key(text: &str) -> String {
    text.replace(' ', "-").to_lowercase()
}

/// Shorten `text` to `keep` characters plus an ellipsis when it is longer
/// than `max` characters.
pub fn abbreviate(text: &str, max: usize, keep: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(keep).collect();
        format!("{}...", head)
    }
}

/// Display id shown on graph nodes, e.g. `E3 - buy car`
pub fn display_id(id_num: u32, event_text: &str) -> String {
    format!(
        "E{} - {}",
        id_num,
        abbreviate(event_text, DISPLAY_TEXT_MAX, DISPLAY_TEXT_KEEP)
    )
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_true() -> bool {
    true
}

/// An argument slot of an event
///
/// Args sharing a `refvar` across events denote the same participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    /// Slot name from the primitive's template
    pub role: String,
    /// Shared reference-variable name
    #[serde(default)]
    pub refvar: Option<String>,
    /// Allowed entity types for the slot filler
    #[serde(default, deserialize_with = "null_as_empty")]
    pub constraints: Vec<String>,
    /// Committed qnode, written at submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Arg {
    pub fn new(role: impl Into<String>, refvar: impl Into<String>, constraints: Vec<String>) -> Self {
        Self {
            role: role.into(),
            refvar: Some(refvar.into()),
            constraints,
            reference: None,
            comment: None,
        }
    }

    /// Whether this arg binds `refvar`
    pub fn uses_refvar(&self, refvar: &str) -> bool {
        self.refvar.as_deref() == Some(refvar)
    }
}

/// A role picked for bulk argument assignment, with the constraints the
/// primitive allows for it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StagedArg {
    pub role: String,
    pub constraints: Vec<String>,
}

/// A single step of a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Free text, unique within a schema
    pub event_text: String,
    #[serde(default)]
    pub event_primitive: Option<EventPrimitive>,
    /// Display id, assigned when the event list is finalized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Sequence number; never reused within a session
    pub id_num: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub args: Vec<Arg>,
    #[serde(default, skip_serializing)]
    pub is_checked: bool,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    /// Included in nonlinear event suggestion requests
    #[serde(default)]
    pub suggested: bool,
    #[serde(skip)]
    pub staged: Option<StagedArg>,
}

impl Event {
    /// Create an unprimed event as entered by the user
    pub fn new(event_text: impl Into<String>, id_num: u32) -> Self {
        Self {
            event_text: event_text.into(),
            event_primitive: None,
            id: None,
            id_num,
            args: Vec::new(),
            is_checked: false,
            reference: None,
            comment: None,
            required: true,
            suggested: true,
            staged: None,
        }
    }

    pub fn with_primitive(mut self, primitive: EventPrimitive) -> Self {
        self.event_primitive = Some(primitive);
        self
    }

    pub fn with_arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    /// Uniqueness key of this event's text
    pub fn key(&self) -> String {
        event_key(&self.event_text)
    }

    /// Ready for ordering and submission
    pub fn is_complete(&self) -> bool {
        !self.event_text.is_empty() && self.event_primitive.is_some()
    }

    /// Refvars bound by this event's args, in slot order
    pub fn refvars(&self) -> impl Iterator<Item = &str> {
        self.args.iter().filter_map(|a| a.refvar.as_deref())
    }
}
