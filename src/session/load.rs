//! Replacing session state from a saved schema

use super::CurationSession;
use crate::graph::SchemaGraph;
use crate::integrity;
use crate::model::{Event, RecommendationGroup, SchemaDetails};
use crate::selector::{Lookup, QnodeSelector};
use serde::{Deserialize, Serialize};

/// A saved schema as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedSchema {
    #[serde(default)]
    pub schema_id: String,
    #[serde(default)]
    pub schema_name: String,
    #[serde(default)]
    pub schema_dscpt: String,
    #[serde(default)]
    pub events: Vec<Event>,
    /// `[before, after]` pairs of event texts
    #[serde(default)]
    pub order: Vec<(String, String)>,
    #[serde(default)]
    pub rec_events: Vec<RecommendationGroup>,
}

impl CurationSession {
    /// Replace the whole session with a saved schema.
    ///
    /// Edges are built from the order pairs; pairs naming an unknown event,
    /// self-loops and repeated pairs are skipped. Colliding event texts are
    /// kept but logged. Selectors are seeded from stored references and the
    /// lookups a fresh view needs are returned.
    pub fn load_schema(&mut self, schema: LoadedSchema) -> Vec<Lookup> {
        let LoadedSchema {
            schema_id,
            schema_name,
            schema_dscpt,
            events,
            order,
            rec_events,
        } = schema;

        let mut graph = SchemaGraph::new();
        for (before, after) in &order {
            let source = events.iter().find(|e| &e.event_text == before);
            let target = events.iter().find(|e| &e.event_text == after);
            match (source, target) {
                (Some(source), Some(target)) => {
                    if let Err(e) = graph.add_edge(source, target) {
                        tracing::warn!(before = %before, after = %after, error = %e, "skipping invalid order pair");
                    }
                }
                _ => tracing::warn!(before = %before, after = %after, "skipping order pair with unknown event"),
            }
        }

        for (i, event) in events.iter().enumerate() {
            if let Some(first) = integrity::find_duplicate(&events[..i], &event.event_text, None) {
                tracing::warn!(first = %first.event_text, second = %event.event_text, "loaded schema repeats an event");
            }
        }

        self.selectors.clear();
        for event in &events {
            if let Some(reference) = event.reference.as_deref().filter(|r| !r.is_empty()) {
                self.selectors
                    .events
                    .insert_if_absent(QnodeSelector::seeded(event.event_text.as_str(), reference));
            }
            for arg in event.args.iter().filter(|a| a.reference.as_deref().is_some_and(|r| !r.is_empty())) {
                if let (Some(refvar), Some(reference)) = (arg.refvar.as_deref(), arg.reference.as_deref()) {
                    self.selectors.refvars.insert_if_absent(QnodeSelector::seeded(refvar, reference));
                }
            }
        }

        let highest = events.iter().map(|e| e.id_num).max().unwrap_or(0);
        self.node_ct = highest.max(u32::try_from(events.len()).unwrap_or(u32::MAX));
        self.events = events;
        self.graph = graph;
        self.details = SchemaDetails::new(schema_id, schema_name, schema_dscpt);
        self.recommendations = rec_events;
        self.tracking.clear();

        tracing::debug!(
            events = self.events.len(),
            edges = self.graph.edge_count(),
            recommendations = self.recommendations.len(),
            "loaded schema"
        );
        self.lookups_for_all()
    }
}
