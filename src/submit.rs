//! Schema submission gate and backend failure mapping

use crate::client::BackendError;
use crate::error::{CurationError, CurationResult};
use crate::graph::Edge;
use crate::model::{Event, SchemaDetails, TrackingEntry};
use crate::session::CurationSession;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `fname` the backend answers with when it refuses a schema
const REJECTED_FNAME: &str = "err";
const CYCLE_IN_GRAPH: &str = "cycle in graph";
const INCONSISTENT_REFVARS: &str = "refvar constraints not consistent";

/// Body posted to the save endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaSubmission {
    pub events: Vec<Event>,
    pub links: Vec<Edge>,
    pub schema_id: String,
    pub schema_name: String,
    pub schema_dscpt: String,
    pub tracking: Vec<TrackingEntry>,
}

/// What the backend returns for a saved schema: the file stem and the
/// rendered YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutput {
    pub fname: String,
    pub output: String,
}

/// Why a submission did not go through
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Rejected locally, before any network call
    #[error(transparent)]
    Invalid(#[from] CurationError),

    #[error("Cycle detected in graph. Please remove cycle and try again.")]
    CycleInGraph,

    #[error("Inconsistent refvar constraints. Please ensure all refvars of same string have consistent constraints.")]
    InconsistentRefvars,

    #[error("Schema not submitted successfully. Check log for more information.")]
    Rejected { status: u16, body: String },

    #[error("Schema not submitted successfully. Check log for more information.")]
    Backend(#[from] BackendError),
}

impl SubmitError {
    /// Map a failed save response to the error shown to the user
    pub fn from_response(status: u16, body: &str) -> Self {
        if status == 400 {
            if let Ok(output) = serde_json::from_str::<SubmissionOutput>(body) {
                if output.fname == REJECTED_FNAME {
                    match output.output.as_str() {
                        CYCLE_IN_GRAPH => return SubmitError::CycleInGraph,
                        INCONSISTENT_REFVARS => return SubmitError::InconsistentRefvars,
                        _ => {}
                    }
                }
            }
        }
        SubmitError::Rejected {
            status,
            body: body.to_string(),
        }
    }
}

/// Schema id present without whitespace; name and description non-empty
pub fn validate_details(details: &SchemaDetails) -> CurationResult<(&str, &str, &str)> {
    let (Some(id), Some(name), Some(dscpt)) = (
        details.schema_id.as_deref(),
        details.schema_name.as_deref(),
        details.schema_dscpt.as_deref(),
    ) else {
        return Err(CurationError::MissingSchemaDetails);
    };
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return Err(CurationError::InvalidSchemaId(id.to_string()));
    }
    if name.is_empty() || dscpt.is_empty() {
        return Err(CurationError::EmptySchemaDetails);
    }
    Ok((id, name, dscpt))
}

impl CurationSession {
    /// Run the submission gate and build the request body.
    ///
    /// Committed qnodes are written into the events first; nothing else is
    /// touched when validation fails.
    pub fn prepare_submission(&mut self) -> CurationResult<SchemaSubmission> {
        let (schema_id, schema_name, schema_dscpt) = {
            let (id, name, dscpt) = validate_details(self.details())?;
            (id.to_string(), name.to_string(), dscpt.to_string())
        };
        self.check_events_complete()?;
        self.save_links();

        Ok(SchemaSubmission {
            events: self.events().to_vec(),
            links: self.graph().edges().to_vec(),
            schema_id,
            schema_name,
            schema_dscpt,
            tracking: self.tracking().to_vec(),
        })
    }
}
