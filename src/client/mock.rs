use super::{BackendError, CuratorBackend, SavedSchema};
use crate::model::{EventPrimitive, PrimitiveRecommendation, SlotTemplates};
use crate::selector::QnodeOption;
use crate::session::LoadedSchema;
use crate::submit::{SchemaSubmission, SubmissionOutput, SubmitError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock backend for testing: returns preconfigured responses.
///
/// Unknown disambiguation queries answer with no candidates, like the real
/// service does for strings it cannot match.
#[derive(Default)]
pub struct MockBackend {
    unavailable: bool,
    event_options: HashMap<String, Vec<QnodeOption>>,
    refvar_options: HashMap<String, Vec<QnodeOption>>,
    top_primitives: HashMap<String, Vec<PrimitiveRecommendation>>,
    primitives: Vec<PrimitiveRecommendation>,
    slots: HashMap<String, SlotTemplates>,
    saved: Vec<SavedSchema>,
    schemas: HashMap<String, LoadedSchema>,
    suggestions: Vec<String>,
    /// Status and body answered to a save; success when unset
    save_failure: Option<(u16, String)>,
    event_lookups: AtomicUsize,
    refvar_lookups: AtomicUsize,
    saves: AtomicUsize,
    suggestion_requests: Mutex<Vec<Vec<String>>>,
    submissions: Mutex<Vec<SchemaSubmission>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every call fails as unreachable
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_event_options(mut self, event_text: impl Into<String>, options: Vec<QnodeOption>) -> Self {
        self.event_options.insert(event_text.into(), options);
        self
    }

    pub fn with_refvar_options(mut self, refvar: impl Into<String>, options: Vec<QnodeOption>) -> Self {
        self.refvar_options.insert(refvar.into(), options);
        self
    }

    pub fn with_top_primitives(
        mut self,
        event_text: impl Into<String>,
        recommendations: Vec<PrimitiveRecommendation>,
    ) -> Self {
        self.top_primitives.insert(event_text.into(), recommendations);
        self
    }

    pub fn with_primitives(mut self, primitives: Vec<PrimitiveRecommendation>) -> Self {
        self.primitives = primitives;
        self
    }

    /// Register slot templates under the full primitive string
    pub fn with_slots(mut self, primitive: impl Into<String>, templates: SlotTemplates) -> Self {
        self.slots.insert(primitive.into(), templates);
        self
    }

    /// Register a saved schema, listed and loadable under `listing.file`
    pub fn with_saved_schema(mut self, listing: SavedSchema, schema: LoadedSchema) -> Self {
        self.schemas.insert(listing.file.clone(), schema);
        self.saved.push(listing);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Answer saves with `status` and `body`
    pub fn with_save_failure(mut self, status: u16, body: impl Into<String>) -> Self {
        self.save_failure = Some((status, body.into()));
        self
    }

    pub fn event_lookups(&self) -> usize {
        self.event_lookups.load(Ordering::SeqCst)
    }

    pub fn refvar_lookups(&self) -> usize {
        self.refvar_lookups.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Event sequences sent with each suggestion request
    pub fn suggestion_requests(&self) -> Vec<Vec<String>> {
        self.suggestion_requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Bodies received by the save endpoint
    pub fn submissions(&self) -> Vec<SchemaSubmission> {
        self.submissions.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.unavailable {
            return Err(BackendError::Unavailable(
                "mock backend configured as unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

fn not_found(what: &str) -> BackendError {
    BackendError::Status {
        status: 404,
        body: format!("no mock response for '{}'", what),
    }
}

#[async_trait]
impl CuratorBackend for MockBackend {
    async fn disambiguate_event(&self, event_text: &str) -> Result<Vec<QnodeOption>, BackendError> {
        self.event_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.event_options.get(event_text).cloned().unwrap_or_default())
    }

    async fn disambiguate_refvar(&self, refvar: &str) -> Result<Vec<QnodeOption>, BackendError> {
        self.refvar_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.refvar_options.get(refvar).cloned().unwrap_or_default())
    }

    async fn top_primitives(&self, event_text: &str) -> Result<Vec<PrimitiveRecommendation>, BackendError> {
        self.check_available()?;
        Ok(self.top_primitives.get(event_text).cloned().unwrap_or_default())
    }

    async fn all_primitives(&self) -> Result<Vec<PrimitiveRecommendation>, BackendError> {
        self.check_available()?;
        Ok(self.primitives.clone())
    }

    async fn slots(&self, primitive: &EventPrimitive) -> Result<SlotTemplates, BackendError> {
        self.check_available()?;
        let key = primitive.to_string();
        self.slots.get(&key).cloned().ok_or_else(|| not_found(&key))
    }

    async fn saved_schemas(&self) -> Result<Vec<SavedSchema>, BackendError> {
        self.check_available()?;
        Ok(self.saved.clone())
    }

    async fn load_schema(&self, file: &str) -> Result<LoadedSchema, BackendError> {
        self.check_available()?;
        self.schemas.get(file).cloned().ok_or_else(|| not_found(file))
    }

    async fn event_suggestions(
        &self,
        _schema_name: &str,
        _schema_dscpt: &str,
        events: &[String],
    ) -> Result<Vec<String>, BackendError> {
        self.check_available()?;
        if let Ok(mut requests) = self.suggestion_requests.lock() {
            requests.push(events.to_vec());
        }
        Ok(self.suggestions.clone())
    }

    async fn save_schema(&self, submission: &SchemaSubmission) -> Result<SubmissionOutput, SubmitError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if let Ok(mut submissions) = self.submissions.lock() {
            submissions.push(submission.clone());
        }
        match &self.save_failure {
            Some((status, body)) => Err(SubmitError::from_response(*status, body)),
            None => Ok(SubmissionOutput {
                fname: submission.schema_id.clone(),
                output: format!("- schema_id: {}\n", submission.schema_id),
            }),
        }
    }
}
