//! Error types for curation operations
//!
//! Display strings double as the user-facing notification text.

use thiserror::Error;

/// Validation failures raised by session operations.
///
/// Every variant short-circuits the triggering action; the session is left
/// unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurationError {
    #[error("Invalid event ID entered. Empty strings are not allowed.")]
    EmptyEventText,

    #[error("Event already exists. Duplicate events cannot be added")]
    DuplicateEvent(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Please enter at least one event.")]
    NoEvents,

    #[error("All events must have a corresponding event primitive.")]
    IncompleteEvent(String),

    #[error("Invalid event primitive: {0}")]
    InvalidPrimitive(String),

    #[error("Cannot create edges to self")]
    SelfLoop(String),

    #[error("Edge between '{from}' and '{to}' already exists")]
    DuplicateEdge { from: String, to: String },

    #[error("Edge does not exist")]
    EdgeNotFound { from: String, to: String },

    #[error("No event selected")]
    NoEventSelected,

    #[error("No anchor event selected")]
    AnchorNotFound(u32),

    #[error("cannot form edges from anchor to self. Please deselect the anchor and try again")]
    AnchorSelected,

    #[error("Empty strings are not allowed.")]
    EmptyRefvar,

    #[error("No role selected for event: {0}")]
    RoleNotStaged(String),

    #[error("Role '{role}' is not a slot of event '{event}'")]
    UnknownRole { event: String, role: String },

    #[error("Slot not found: {role} ({event})")]
    SlotNotFound { event: String, role: String },

    #[error("No disambiguation options loaded for '{0}'")]
    SelectorNotFound(String),

    #[error("'{qnode}' is not a candidate for '{query}'")]
    UnknownCandidate { query: String, qnode: String },

    #[error("Recommendation not found: {0}")]
    RecommendationNotFound(String),

    #[error("Enter schema ID, name and description values to continue")]
    MissingSchemaDetails,

    #[error("Invalid ID entered")]
    InvalidSchemaId(String),

    #[error("Schema name/description cannot be empty")]
    EmptySchemaDetails,
}

/// Result type for curation operations
pub type CurationResult<T> = Result<T, CurationError>;
