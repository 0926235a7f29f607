//! CurationSession: the owned state of one schema being authored
//!
//! Every mutation goes through a session method so the event list, the
//! ordering graph, the selector caches and the audit trail stay consistent.
//! Methods are synchronous; the ones that make a disambiguation fetch
//! necessary return [`Lookup`]s for the caller to run and feed back through
//! [`CurationSession::apply_lookup`].

mod events;
mod load;
mod recommendations;
mod slots;

pub use events::EdgeOrder;
pub use load::LoadedSchema;
pub use slots::SlotEdit;

use crate::error::{CurationError, CurationResult};
use crate::graph::SchemaGraph;
use crate::integrity::{self, Violation};
use crate::model::{Event, RecommendationGroup, SchemaDetails, TrackingEntry};
use crate::selector::{Lookup, QnodeOption, SelectorKind, Selectors};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Prefix of the comment recorded next to a committed qnode
const QNODE_COMMENT_PREFIX: &str = "Qnode: ";

/// State of one schema under construction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurationSession {
    #[serde(default)]
    events: Vec<Event>,
    /// Highest sequence number handed out so far
    #[serde(default)]
    node_ct: u32,
    #[serde(default)]
    graph: SchemaGraph,
    #[serde(default)]
    selectors: Selectors,
    #[serde(default)]
    details: SchemaDetails,
    #[serde(default)]
    recommendations: Vec<RecommendationGroup>,
    #[serde(default)]
    tracking: Vec<TrackingEntry>,
}

impl CurationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, event_text: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.event_text == event_text)
    }

    fn event_mut(&mut self, event_text: &str) -> CurationResult<&mut Event> {
        self.events
            .iter_mut()
            .find(|e| e.event_text == event_text)
            .ok_or_else(|| CurationError::EventNotFound(event_text.to_string()))
    }

    pub fn node_count(&self) -> u32 {
        self.node_ct
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn details(&self) -> &SchemaDetails {
        &self.details
    }

    pub fn recommendations(&self) -> &[RecommendationGroup] {
        &self.recommendations
    }

    pub fn tracking(&self) -> &[TrackingEntry] {
        &self.tracking
    }

    /// Replace the schema metadata
    pub fn update_schema_details(&mut self, details: SchemaDetails) {
        self.details = details;
    }

    /// Append an audit-trail entry
    pub fn track(&mut self, entry: TrackingEntry) {
        self.tracking.push(entry);
    }

    /// Record that the user picked a suggested event; returns its text for
    /// the event input
    pub fn select_suggestion(&mut self, event_text: &str) -> String {
        self.track(TrackingEntry::suggestion_select(event_text));
        event_text.to_string()
    }

    /// Drop everything and start a fresh schema
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Every lookup a freshly opened view needs: one per event text and one
    /// per distinct refvar that is not cached with options
    pub fn lookups_for_all(&self) -> Vec<Lookup> {
        let mut lookups: Vec<Lookup> = integrity::used_event_texts(&self.events)
            .filter_map(|text| self.selectors.lookup_for(SelectorKind::Event, text))
            .collect();
        let mut seen = HashSet::new();
        for refvar in integrity::used_refvars(&self.events) {
            if seen.insert(refvar) {
                lookups.extend(self.selectors.lookup_for(SelectorKind::Refvar, refvar));
            }
        }
        lookups
    }

    /// Whether the string a lookup was made for is still referenced
    pub fn is_referenced(&self, kind: SelectorKind, query: &str) -> bool {
        match kind {
            SelectorKind::Event => self.event(query).is_some(),
            SelectorKind::Refvar => integrity::refvar_in_use(&self.events, query),
        }
    }

    /// Store the candidates fetched for `lookup`.
    ///
    /// Responses for strings that were deleted or renamed while the fetch was
    /// pending are dropped; returns whether the response was stored.
    pub fn apply_lookup(&mut self, lookup: &Lookup, options: Vec<QnodeOption>) -> bool {
        if !self.is_referenced(lookup.kind, &lookup.query) {
            tracing::debug!(kind = %lookup.kind, query = %lookup.query, "dropping late lookup response");
            return false;
        }
        let selector = self.selectors.cache_mut(lookup.kind).apply(&lookup.query, options);
        tracing::debug!(
            kind = %lookup.kind,
            query = %lookup.query,
            options = selector.options.len(),
            "stored lookup response"
        );
        true
    }

    /// Set the pending qnode of a selector; `None` declines every candidate
    pub fn select_qnode(
        &mut self,
        kind: SelectorKind,
        query: &str,
        qnode: Option<&str>,
    ) -> CurationResult<()> {
        let selector = self
            .selectors
            .cache_mut(kind)
            .get_mut(query)
            .ok_or_else(|| CurationError::SelectorNotFound(query.to_string()))?;
        if !selector.select(qnode) {
            return Err(CurationError::UnknownCandidate {
                query: query.to_string(),
                qnode: qnode.unwrap_or_default().to_string(),
            });
        }
        Ok(())
    }

    /// Commit the pending choice of every selector of `kind`
    pub fn commit_selections(&mut self, kind: SelectorKind) {
        self.selectors.cache_mut(kind).commit_all();
    }

    /// Revert the pending choice of every selector of `kind`
    pub fn discard_selections(&mut self, kind: SelectorKind) {
        self.selectors.cache_mut(kind).discard_all();
    }

    /// Rebuild the selector caches from what the events still reference
    pub fn prune(&mut self) {
        let pruned = integrity::prune(&self.events, &self.selectors);
        let dropped = (self.selectors.events.len() - pruned.events.len())
            + (self.selectors.refvars.len() - pruned.refvars.len());
        if dropped > 0 {
            tracing::debug!(dropped, "pruned unreferenced selectors");
        }
        self.selectors = pruned;
    }

    /// Broken cross-references, if any
    pub fn audit(&self) -> Vec<Violation> {
        integrity::audit(&self.events, &self.graph, &self.selectors)
    }

    /// Copy committed qnodes into the `reference` and `comment` of the events
    /// and args they disambiguate
    pub fn save_links(&mut self) {
        let Self {
            events, selectors, ..
        } = self;
        for event in events.iter_mut() {
            if let Some((qnode, comment)) = committed_link(selectors, SelectorKind::Event, &event.event_text) {
                event.reference = Some(qnode);
                event.comment = Some(comment);
            }
            for arg in event.args.iter_mut() {
                let Some(refvar) = arg.refvar.as_deref() else {
                    continue;
                };
                if let Some((qnode, comment)) = committed_link(selectors, SelectorKind::Refvar, refvar) {
                    arg.reference = Some(qnode);
                    arg.comment = Some(comment);
                }
            }
        }
    }
}

/// Committed qnode of `query` and the comment naming it
fn committed_link(selectors: &Selectors, kind: SelectorKind, query: &str) -> Option<(String, String)> {
    let selector = selectors.cache(kind).get(query)?;
    let qnode = selector.qnode.clone().filter(|q| !q.is_empty())?;
    let raw_name = selector
        .committed_option()
        .map(|o| o.raw_name.clone())
        .unwrap_or_else(|| qnode.clone());
    Some((qnode, format!("{}{}", QNODE_COMMENT_PREFIX, raw_name)))
}
