//! Backend client: disambiguation, recommendation and persistence service
//!
//! Defines the client trait and the wire types of the curation backend.
//! Two implementations:
//! - `HttpBackend`: JSON over HTTP against the running backend (production)
//! - `MockBackend`: returns preconfigured responses and counts calls (testing)

mod http;
mod mock;

pub use http::HttpBackend;
pub use mock::MockBackend;

use crate::model::{EventPrimitive, PrimitiveRecommendation, SlotTemplates};
use crate::selector::{Lookup, QnodeOption, SelectorKind};
use crate::session::LoadedSchema;
use crate::submit::{SchemaSubmission, SubmissionOutput, SubmitError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors from backend calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend not available: {0}")]
    Unavailable(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response parse error: {0}")]
    Decode(String),
}

/// Candidates returned by the disambiguation endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QnodeResponse {
    #[serde(default)]
    pub options: Vec<QnodeOption>,
}

/// A saved schema file as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSchema {
    /// File stem, used to load the schema
    pub file: String,
    pub schema_id: String,
    pub schema_name: String,
    #[serde(default)]
    pub schema_dscpt: String,
    #[serde(default)]
    pub timestamp: String,
    /// Whether recommended follow-up events exist for this schema
    #[serde(default)]
    pub augmentation_flag: bool,
}

impl SavedSchema {
    /// Case-sensitive substring match on id, name or description; an empty
    /// query matches everything
    pub fn matches(&self, query: &str) -> bool {
        query.is_empty()
            || self.schema_id.contains(query)
            || self.schema_name.contains(query)
            || self.schema_dscpt.contains(query)
    }
}

/// Client trait for the curation backend.
///
/// Abstracts over transport so the curator doesn't depend on how the
/// backend is reached.
#[async_trait]
pub trait CuratorBackend: Send + Sync {
    /// Candidate qnodes for an event description
    async fn disambiguate_event(&self, event_text: &str) -> Result<Vec<QnodeOption>, BackendError>;

    /// Candidate qnodes for a refvar
    async fn disambiguate_refvar(&self, refvar: &str) -> Result<Vec<QnodeOption>, BackendError>;

    /// Best `type.subtype` matches for an event description
    async fn top_primitives(&self, event_text: &str) -> Result<Vec<PrimitiveRecommendation>, BackendError>;

    /// Every `type.subtype` the ontology knows
    async fn all_primitives(&self) -> Result<Vec<PrimitiveRecommendation>, BackendError>;

    /// Slot templates of a primitive
    async fn slots(&self, primitive: &EventPrimitive) -> Result<SlotTemplates, BackendError>;

    async fn saved_schemas(&self) -> Result<Vec<SavedSchema>, BackendError>;

    /// Load a saved schema by file stem
    async fn load_schema(&self, file: &str) -> Result<LoadedSchema, BackendError>;

    /// Follow-up events predicted for a schema's name, description and
    /// event sequence
    async fn event_suggestions(
        &self,
        schema_name: &str,
        schema_dscpt: &str,
        events: &[String],
    ) -> Result<Vec<String>, BackendError>;

    /// Persist a schema; refusals are mapped through [`SubmitError::from_response`]
    async fn save_schema(&self, submission: &SchemaSubmission) -> Result<SubmissionOutput, SubmitError>;

    /// Run a lookup against the matching disambiguation endpoint
    async fn disambiguate(&self, lookup: &Lookup) -> Result<Vec<QnodeOption>, BackendError> {
        match lookup.kind {
            SelectorKind::Event => self.disambiguate_event(&lookup.query).await,
            SelectorKind::Refvar => self.disambiguate_refvar(&lookup.query).await,
        }
    }
}
