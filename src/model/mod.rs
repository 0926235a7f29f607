//! Schema data model

mod event;
mod primitive;
mod recommendation;
mod tracking;

pub use event::{abbreviate, display_id, event_key, Arg, Event, StagedArg};
pub use primitive::{EventPrimitive, PrimitiveRecommendation, SlotTemplates, UNSPECIFIED_SUBSUBTYPE};
pub use recommendation::{RecommendationGroup, RecommendedEvent};
pub use tracking::{TrackingEntry, TrackingKind};

use serde::{Deserialize, Serialize};

/// Schema metadata entered by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDetails {
    #[serde(default)]
    pub schema_id: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub schema_dscpt: Option<String>,
}

impl SchemaDetails {
    pub fn new(
        schema_id: impl Into<String>,
        schema_name: impl Into<String>,
        schema_dscpt: impl Into<String>,
    ) -> Self {
        Self {
            schema_id: Some(schema_id.into()),
            schema_name: Some(schema_name.into()),
            schema_dscpt: Some(schema_dscpt.into()),
        }
    }
}
