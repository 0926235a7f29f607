//! Curator: drives a session against a backend
//!
//! Session operations are synchronous and report the disambiguation fetches
//! they need as [`Lookup`]s. The curator runs those against the backend and
//! feeds the answers back, so a query is checked against the cache before it
//! is ever sent.

use crate::client::{BackendError, CuratorBackend, SavedSchema};
use crate::error::CurationError;
use crate::model::{EventPrimitive, PrimitiveRecommendation, SlotTemplates, TrackingEntry};
use crate::selector::Lookup;
use crate::session::{CurationSession, SlotEdit};
use crate::submit::{SubmissionOutput, SubmitError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Which events are sent when asking for follow-up suggestions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionMode {
    /// Every event, in list order
    #[default]
    Linear,
    /// Only events flagged as `suggested`
    Nonlinear,
}

impl SuggestionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionMode::Linear => "linear",
            SuggestionMode::Nonlinear => "nonlinear",
        }
    }
}

impl fmt::Display for SuggestionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from curator operations that touch the backend
#[derive(Debug, Error)]
pub enum CuratorError {
    #[error(transparent)]
    Curation(#[from] CurationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type CuratorResult<T> = Result<T, CuratorError>;

pub struct Curator<B: CuratorBackend> {
    session: CurationSession,
    backend: Arc<B>,
    suggestion_mode: SuggestionMode,
}

impl<B: CuratorBackend> Curator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_session(backend, CurationSession::new())
    }

    /// Resume an existing session
    pub fn with_session(backend: Arc<B>, session: CurationSession) -> Self {
        Self {
            session,
            backend,
            suggestion_mode: SuggestionMode::default(),
        }
    }

    pub fn with_suggestion_mode(mut self, mode: SuggestionMode) -> Self {
        self.suggestion_mode = mode;
        self
    }

    pub fn session(&self) -> &CurationSession {
        &self.session
    }

    /// Direct access for operations that need no backend call
    pub fn session_mut(&mut self) -> &mut CurationSession {
        &mut self.session
    }

    pub fn into_session(self) -> CurationSession {
        self.session
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Run `lookups` and store the answers.
    ///
    /// A failed fetch is logged and leaves its selector uncached, so the next
    /// view asks again. Returns the number of answers stored.
    pub async fn run_lookups(&mut self, lookups: Vec<Lookup>) -> usize {
        let mut stored = 0;
        for lookup in lookups {
            match self.backend.disambiguate(&lookup).await {
                Ok(options) => {
                    if self.session.apply_lookup(&lookup, options) {
                        stored += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(kind = %lookup.kind, query = %lookup.query, error = %e, "disambiguation failed");
                }
            }
        }
        stored
    }

    /// Fetch everything a freshly opened view needs
    pub async fn open(&mut self) -> usize {
        let lookups = self.session.lookups_for_all();
        self.run_lookups(lookups).await
    }

    pub async fn add_event(&mut self, input: &str) -> Result<(), CurationError> {
        let lookups = self.session.add_event(input)?;
        self.run_lookups(lookups).await;
        Ok(())
    }

    pub async fn rename_event(&mut self, old_text: &str, new_input: &str) -> Result<(), CurationError> {
        let lookups = self.session.rename_event(old_text, new_input)?;
        self.run_lookups(lookups).await;
        Ok(())
    }

    pub async fn add_arg(&mut self, refvar: &str, constraints: Vec<String>) -> Result<(), CurationError> {
        let lookups = self.session.add_arg(refvar, constraints)?;
        self.run_lookups(lookups).await;
        Ok(())
    }

    pub async fn save_slot(
        &mut self,
        event_text: &str,
        old_role: &str,
        old_refvar: Option<&str>,
        edit: SlotEdit,
    ) -> Result<(), CurationError> {
        let lookups = self.session.save_slot(event_text, old_role, old_refvar, edit)?;
        self.run_lookups(lookups).await;
        Ok(())
    }

    pub async fn add_recommended_event(
        &mut self,
        event_text: &str,
        primitive: EventPrimitive,
        link: bool,
    ) -> Result<(), CurationError> {
        let lookups = self.session.add_recommended_event(event_text, primitive, link)?;
        self.run_lookups(lookups).await;
        Ok(())
    }

    /// Best primitive candidates for an event description
    pub async fn recommend_primitives(&self, event_text: &str) -> Result<Vec<PrimitiveRecommendation>, BackendError> {
        self.backend.top_primitives(event_text).await
    }

    pub async fn all_primitives(&self) -> Result<Vec<PrimitiveRecommendation>, BackendError> {
        self.backend.all_primitives().await
    }

    /// Slot templates for the primitive of `event_text`
    pub async fn slot_templates(&self, event_text: &str) -> CuratorResult<SlotTemplates> {
        let event = self
            .session
            .event(event_text)
            .ok_or_else(|| CurationError::EventNotFound(event_text.to_string()))?;
        let primitive = event
            .event_primitive
            .as_ref()
            .ok_or_else(|| CurationError::IncompleteEvent(event_text.to_string()))?;
        Ok(self.backend.slots(primitive).await?)
    }

    /// Ask for follow-up events given the schema so far.
    ///
    /// Nothing is sent when no event qualifies under the current mode. The
    /// request and its answer are both recorded in the audit trail.
    pub async fn suggest_events(&mut self) -> CuratorResult<Vec<String>> {
        let events: Vec<String> = self
            .session
            .events()
            .iter()
            .filter(|e| self.suggestion_mode == SuggestionMode::Linear || e.suggested)
            .map(|e| e.event_text.clone())
            .collect();
        if events.is_empty() {
            return Ok(Vec::new());
        }
        let details = self.session.details();
        let (Some(name), Some(dscpt)) = (details.schema_name.clone(), details.schema_dscpt.clone()) else {
            return Err(CurationError::MissingSchemaDetails.into());
        };

        let input = json!({ "schema_name": name, "schema_dscpt": dscpt, "events": events });
        self.session
            .track(TrackingEntry::suggestion_input(input, self.suggestion_mode.as_str()));
        let suggestions = self.backend.event_suggestions(&name, &dscpt, &events).await?;
        self.session.track(TrackingEntry::suggestion_output(&suggestions));
        tracing::debug!(mode = %self.suggestion_mode, sent = events.len(), received = suggestions.len(), "event suggestions");
        Ok(suggestions)
    }

    /// Saved schemas matching `query` on id, name or description
    pub async fn saved_schemas(&self, query: &str) -> Result<Vec<SavedSchema>, BackendError> {
        let mut schemas = self.backend.saved_schemas().await?;
        schemas.retain(|s| s.matches(query));
        Ok(schemas)
    }

    /// Replace the session with a saved schema and fetch its selectors
    pub async fn load_saved_schema(&mut self, file: &str) -> Result<(), BackendError> {
        let schema = self.backend.load_schema(file).await?;
        let lookups = self.session.load_schema(schema);
        tracing::info!(file = %file, events = self.session.events().len(), "loaded saved schema");
        self.run_lookups(lookups).await;
        Ok(())
    }

    /// Validate and submit the schema.
    ///
    /// Validation failures never reach the backend. With `reset`, a
    /// successful submission starts a fresh session.
    pub async fn submit(&mut self, reset: bool) -> Result<SubmissionOutput, SubmitError> {
        let submission = self.session.prepare_submission()?;
        match self.backend.save_schema(&submission).await {
            Ok(output) => {
                tracing::info!(fname = %output.fname, events = submission.events.len(), "schema submitted");
                if reset {
                    self.session.reset();
                }
                Ok(output)
            }
            Err(e) => {
                tracing::error!(schema_id = %submission.schema_id, error = ?e, "schema submission failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockBackend;
    use crate::model::SchemaDetails;
    use crate::selector::{QnodeOption, SelectorKind};
    use crate::session::LoadedSchema;

    fn backend() -> MockBackend {
        MockBackend::new()
            .with_event_options("buy", vec![QnodeOption::new("Q1", "purchase")])
            .with_event_options("sell", vec![QnodeOption::new("Q2", "sale")])
            .with_refvar_options("person", vec![QnodeOption::new("Q5", "human")])
    }

    async fn curator_with(backend: MockBackend, texts: &[&str]) -> Curator<MockBackend> {
        let mut curator = Curator::new(Arc::new(backend));
        for text in texts {
            curator.add_event(text).await.unwrap();
            curator
                .session_mut()
                .set_primitive(text, "Transaction.ExchangeBuySell.Unspecified".parse().unwrap())
                .unwrap();
        }
        curator
    }

    #[tokio::test]
    async fn adding_events_fetches_each_text_once() {
        let mut curator = curator_with(backend(), &["buy", "sell"]).await;
        assert_eq!(curator.backend().event_lookups(), 2);
        let selector = curator.session().selectors().events.get("buy").unwrap();
        assert_eq!(selector.options.len(), 2);

        // everything is cached with options now
        assert_eq!(curator.open().await, 0);
        assert_eq!(curator.backend().event_lookups(), 2);
    }

    #[tokio::test]
    async fn text_without_candidates_is_fetched_again() {
        let mut curator = curator_with(backend(), &["ship"]).await;
        assert_eq!(curator.backend().event_lookups(), 1);
        curator.open().await;
        assert_eq!(curator.backend().event_lookups(), 2);
    }

    #[tokio::test]
    async fn failed_lookup_is_not_fatal() {
        let mut curator = Curator::new(Arc::new(MockBackend::unavailable()));
        curator.add_event("buy").await.unwrap();
        assert!(curator.session().event("buy").is_some());
        assert!(curator.session().selectors().events.is_empty());
    }

    #[tokio::test]
    async fn shared_refvar_is_fetched_once() {
        let mut curator = curator_with(backend(), &["buy", "sell"]).await;
        let templates = SlotTemplates {
            slots: vec!["Giver".into()],
            constraints: vec![vec!["per".into()]],
        };
        for text in ["buy", "sell"] {
            let session = curator.session_mut();
            session.set_checked(text, true).unwrap();
            session.stage_arg(text, "Giver", &templates).unwrap();
        }
        curator.add_arg("person", vec![]).await.unwrap();
        assert_eq!(curator.backend().refvar_lookups(), 1);

        curator
            .save_slot("buy", "Giver", Some("person"), SlotEdit::new("Giver", "person", vec![]))
            .await
            .unwrap();
        assert_eq!(curator.backend().refvar_lookups(), 1);
        assert!(curator.session().selectors().refvars.contains("person"));
    }

    #[tokio::test]
    async fn slot_templates_need_a_primitive() {
        let backend = backend().with_slots(
            "Transaction.ExchangeBuySell.Unspecified",
            SlotTemplates {
                slots: vec!["Giver".into()],
                constraints: vec![vec!["per".into()]],
            },
        );
        let mut curator = curator_with(backend, &["buy"]).await;
        let templates = curator.slot_templates("buy").await.unwrap();
        assert_eq!(templates.slots, vec!["Giver".to_string()]);

        curator.add_event("sell").await.unwrap();
        let err = curator.slot_templates("sell").await.unwrap_err();
        assert!(matches!(err, CuratorError::Curation(CurationError::IncompleteEvent(_))));
    }

    #[tokio::test]
    async fn nonlinear_suggestions_send_only_suggested_events() {
        // events of a saved schema come back without the `suggested` flag
        let schema: LoadedSchema = serde_json::from_value(json!({
            "schema_id": "trade",
            "schema_name": "Trade",
            "schema_dscpt": "Goods change hands",
            "events": [{"event_text": "buy", "event_primitive": "Transaction.ExchangeBuySell.Unspecified", "id_num": 1}],
            "order": [],
            "rec_events": []
        }))
        .unwrap();
        let listing = SavedSchema {
            file: "trade".into(),
            schema_id: "trade".into(),
            schema_name: "Trade".into(),
            schema_dscpt: "Goods change hands".into(),
            timestamp: String::new(),
            augmentation_flag: false,
        };
        let backend = backend()
            .with_saved_schema(listing, schema)
            .with_suggestions(vec!["ship".into()]);
        let mut curator = Curator::new(Arc::new(backend)).with_suggestion_mode(SuggestionMode::Nonlinear);

        curator.load_saved_schema("trade").await.unwrap();
        assert_eq!(curator.suggest_events().await.unwrap(), Vec::<String>::new());
        assert!(curator.backend().suggestion_requests().is_empty());

        curator.add_event("sell").await.unwrap();
        assert_eq!(curator.suggest_events().await.unwrap(), vec!["ship".to_string()]);
        assert_eq!(curator.backend().suggestion_requests(), vec![vec!["sell".to_string()]]);
        assert_eq!(curator.session().tracking()[1].data["mode"], "nonlinear");
    }

    #[tokio::test]
    async fn suggestions_are_tracked() {
        let backend = backend().with_suggestions(vec!["ship".into(), "pay".into()]);
        let mut curator = curator_with(backend, &["buy", "sell"]).await;
        curator
            .session_mut()
            .update_schema_details(SchemaDetails::new("trade", "Trade", "Goods change hands"));

        let suggestions = curator.suggest_events().await.unwrap();
        assert_eq!(suggestions, vec!["ship".to_string(), "pay".to_string()]);
        assert_eq!(
            curator.backend().suggestion_requests(),
            vec![vec!["buy".to_string(), "sell".to_string()]]
        );

        let tracking = curator.session().tracking();
        let input = &tracking[tracking.len() - 2];
        assert_eq!(input.data["mode"], "linear");
        assert_eq!(input.data["input"]["events"][1], "sell");
        assert_eq!(tracking[tracking.len() - 1].data[0], "ship");
    }

    #[tokio::test]
    async fn suggestions_need_schema_details() {
        let mut curator = curator_with(backend(), &["buy"]).await;
        let err = curator.suggest_events().await.unwrap_err();
        assert!(matches!(err, CuratorError::Curation(CurationError::MissingSchemaDetails)));
    }

    #[tokio::test]
    async fn invalid_submission_never_reaches_backend() {
        let mut curator = curator_with(backend(), &["buy"]).await;
        let err = curator.submit(false).await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(CurationError::MissingSchemaDetails)));
        assert_eq!(curator.backend().saves(), 0);
    }

    #[tokio::test]
    async fn successful_submission_can_reset() {
        let mut curator = curator_with(backend(), &["buy", "sell"]).await;
        curator.session_mut().add_edge("buy", "sell").unwrap();
        curator
            .session_mut()
            .select_qnode(SelectorKind::Event, "buy", Some("Q1"))
            .unwrap();
        curator.session_mut().commit_selections(SelectorKind::Event);
        curator
            .session_mut()
            .update_schema_details(SchemaDetails::new("trade", "Trade", "Goods change hands"));

        let output = curator.submit(true).await.unwrap();
        assert_eq!(output.fname, "trade");
        assert!(curator.session().events().is_empty());

        let sent = &curator.backend().submissions()[0];
        assert_eq!(sent.links.len(), 1);
        assert_eq!(sent.events[0].reference.as_deref(), Some("Q1"));
    }

    #[tokio::test]
    async fn refused_submission_keeps_session() {
        let backend = backend().with_save_failure(400, r#"{"fname": "err", "output": "refvar constraints not consistent"}"#);
        let mut curator = curator_with(backend, &["buy"]).await;
        curator
            .session_mut()
            .update_schema_details(SchemaDetails::new("trade", "Trade", "Goods change hands"));

        let err = curator.submit(true).await.unwrap_err();
        assert!(matches!(err, SubmitError::InconsistentRefvars));
        assert_eq!(curator.session().events().len(), 1);
    }
}
