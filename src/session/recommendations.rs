//! Recommended follow-up events

use super::CurationSession;
use crate::error::{CurationError, CurationResult};
use crate::graph::GraphNode;
use crate::integrity;
use crate::model::{abbreviate, Event, EventPrimitive, RecommendedEvent};
use crate::selector::{Lookup, SelectorKind};

/// Anchor label used when the anchor event no longer exists
const MISSING_ANCHOR: &str = "DNE";

impl CurationSession {
    /// Accept a recommended event into the schema.
    ///
    /// The event gets a node right away; with `link` it is also ordered after
    /// the head of its recommendation group. The recommendation is consumed and
    /// an emptied group disappears.
    pub fn add_recommended_event(
        &mut self,
        event_text: &str,
        primitive: EventPrimitive,
        link: bool,
    ) -> CurationResult<Vec<Lookup>> {
        if integrity::find_duplicate(&self.events, event_text, None).is_some() {
            return Err(CurationError::DuplicateEvent(event_text.to_string()));
        }
        let group_idx = self
            .recommendations
            .iter()
            .position(|g| g.contains(event_text))
            .ok_or_else(|| CurationError::RecommendationNotFound(event_text.to_string()))?;

        let id_num = self.node_ct + 1;
        let mut event = Event::new(event_text, id_num);
        event.id = Some(format!(
            "E{} - {} - {}",
            id_num,
            abbreviate(primitive.subtype(), 15, 11),
            abbreviate(event_text, 10, 9)
        ));
        event.event_primitive = Some(primitive);
        event.required = false;
        event.suggested = false;

        self.graph.add_node(GraphNode::from(&event));
        self.events.push(event);
        self.node_ct = id_num;

        if link {
            let head = self.recommendations[group_idx].after.clone();
            let source = self.events.iter().find(|e| e.event_text == head);
            let target = self.events.last();
            match (source, target) {
                (Some(source), Some(target)) => {
                    self.graph.add_edge(source, target)?;
                }
                _ => tracing::warn!(event = %event_text, anchor = %head, "recommendation anchor is gone; not linking"),
            }
        }

        let group = &mut self.recommendations[group_idx];
        group.take(event_text);
        if group.events.is_empty() {
            self.recommendations.remove(group_idx);
        }
        tracing::debug!(event = %event_text, id_num, link, "added recommended event");

        Ok(self
            .selectors
            .lookup_for(SelectorKind::Event, event_text)
            .into_iter()
            .collect())
    }

    /// Recommendations as listed to the user, numbered from zero
    pub fn recommendation_rows(&self) -> Vec<RecommendedEvent> {
        let mut rows = Vec::new();
        let mut ctr = 0;
        for group in &self.recommendations {
            let after = match self.event(&group.after) {
                Some(anchor) => format!("E{} - {}", anchor.id_num, abbreviate(&anchor.event_text, 10, 9)),
                None => MISSING_ANCHOR.to_string(),
            };
            for event_text in &group.events {
                rows.push(RecommendedEvent {
                    event_text: event_text.clone(),
                    after: after.clone(),
                    id_num: ctr,
                });
                ctr += 1;
            }
        }
        rows
    }
}
