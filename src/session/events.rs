//! Event list and ordering operations

use super::CurationSession;
use crate::error::{CurationError, CurationResult};
use crate::graph::EdgeId;
use crate::integrity;
use crate::model::{display_id, Event, EventPrimitive, PrimitiveRecommendation, TrackingEntry};
use crate::selector::{Lookup, SelectorKind};
use serde::{Deserialize, Serialize};

/// Direction of the edges created between an anchor and the checked events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeOrder {
    /// Checked events happen before the anchor
    Precede,
    /// Checked events happen after the anchor
    Succeed,
}

impl CurationSession {
    /// Add an event for `input`, trimmed.
    ///
    /// Returns the lookup for the new event text when it is not cached.
    pub fn add_event(&mut self, input: &str) -> CurationResult<Vec<Lookup>> {
        let text = input.trim();
        if text.is_empty() {
            return Err(CurationError::EmptyEventText);
        }
        if integrity::find_duplicate(&self.events, text, None).is_some() {
            return Err(CurationError::DuplicateEvent(text.to_string()));
        }

        let event = Event::new(text, self.node_ct + 1);
        self.node_ct += 1;
        tracing::debug!(event = %text, id_num = event.id_num, "added event");
        self.events.push(event);
        self.track(TrackingEntry::add_event(text));

        Ok(self
            .selectors
            .lookup_for(SelectorKind::Event, text)
            .into_iter()
            .collect())
    }

    /// Delete an event together with its node, every edge touching it, and
    /// the selectors nothing references anymore
    pub fn delete_event(&mut self, event_text: &str) -> CurationResult<Event> {
        let idx = self
            .events
            .iter()
            .position(|e| e.event_text == event_text)
            .ok_or_else(|| CurationError::EventNotFound(event_text.to_string()))?;
        let event = self.events.remove(idx);
        let edges_removed = self.graph.remove_event(event_text);
        self.prune();
        self.track(TrackingEntry::delete_event(event_text));
        tracing::debug!(event = %event_text, edges_removed, "deleted event");
        Ok(event)
    }

    /// Change an event's text, carrying its edges over to the new text
    pub fn rename_event(&mut self, old_text: &str, new_input: &str) -> CurationResult<Vec<Lookup>> {
        let new_text = new_input.trim();
        if new_text.is_empty() {
            return Err(CurationError::EmptyEventText);
        }
        if self.event(old_text).is_none() {
            return Err(CurationError::EventNotFound(old_text.to_string()));
        }
        if new_text == old_text {
            return Ok(Vec::new());
        }
        if integrity::find_duplicate(&self.events, new_text, Some(old_text)).is_some() {
            return Err(CurationError::DuplicateEvent(new_text.to_string()));
        }

        let event = self.event_mut(old_text)?;
        event.event_text = new_text.to_string();
        if event.id.is_some() {
            event.id = Some(display_id(event.id_num, new_text));
        }
        if let Some(renamed) = self.events.iter().find(|e| e.event_text == new_text) {
            self.graph.rename(old_text, renamed);
        }
        for group in self.recommendations.iter_mut().filter(|g| g.after == old_text) {
            group.after = new_text.to_string();
        }
        self.track(TrackingEntry::edit_event(old_text, new_text));
        self.prune();

        Ok(self
            .selectors
            .lookup_for(SelectorKind::Event, new_text)
            .into_iter()
            .collect())
    }

    /// Move the event at `from` to `to`; out-of-range indices are clamped
    pub fn move_event(&mut self, from: usize, to: usize) {
        if self.events.is_empty() {
            return;
        }
        let last = self.events.len() - 1;
        let (from, to) = (from.min(last), to.min(last));
        let event = self.events.remove(from);
        self.events.insert(to, event);
        self.track(TrackingEntry::reorder_event(from, to));
    }

    pub fn set_primitive(&mut self, event_text: &str, primitive: EventPrimitive) -> CurationResult<()> {
        let event = self.event_mut(event_text)?;
        tracing::debug!(event = %event_text, primitive = %primitive, "set primitive");
        event.event_primitive = Some(primitive);
        Ok(())
    }

    /// Assign the default primitive of a recommended `type.subtype`
    pub fn choose_recommended_primitive(
        &mut self,
        event_text: &str,
        recommendation: &PrimitiveRecommendation,
    ) -> CurationResult<EventPrimitive> {
        let primitive = recommendation.default_primitive()?;
        self.set_primitive(event_text, primitive.clone())?;
        Ok(primitive)
    }

    /// Clear an event's primitive and the args that depended on it
    pub fn deselect_primitive(&mut self, event_text: &str) -> CurationResult<()> {
        let event = self.event_mut(event_text)?;
        event.event_primitive = None;
        event.args.clear();
        event.staged = None;
        self.prune();
        Ok(())
    }

    pub fn set_checked(&mut self, event_text: &str, checked: bool) -> CurationResult<()> {
        self.event_mut(event_text)?.is_checked = checked;
        Ok(())
    }

    /// Events that are checked for a bulk action, in list order
    pub fn checked_events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_checked)
    }

    /// At least one event, and every event has text and a primitive
    pub fn check_events_complete(&self) -> CurationResult<()> {
        if self.events.is_empty() {
            return Err(CurationError::NoEvents);
        }
        match self.events.iter().find(|e| !e.is_complete()) {
            Some(event) => Err(CurationError::IncompleteEvent(event.event_text.clone())),
            None => Ok(()),
        }
    }

    /// Close the event list for ordering: validate, prune selectors, assign
    /// display ids and rebuild the graph nodes
    pub fn finalize(&mut self) -> CurationResult<()> {
        self.check_events_complete()?;
        self.prune();
        for event in self.events.iter_mut() {
            event.id = Some(display_id(event.id_num, &event.event_text));
        }
        let edges_removed = self.graph.rebuild(&self.events);
        tracing::debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            edges_removed,
            "finalized event list"
        );
        Ok(())
    }

    /// Order `source` before `target`
    pub fn add_edge(&mut self, source: &str, target: &str) -> CurationResult<EdgeId> {
        let source = self
            .events
            .iter()
            .find(|e| e.event_text == source)
            .ok_or_else(|| CurationError::EventNotFound(source.to_string()))?;
        let target = self
            .events
            .iter()
            .find(|e| e.event_text == target)
            .ok_or_else(|| CurationError::EventNotFound(target.to_string()))?;
        let edge = self.graph.add_edge(source, target)?;
        Ok(edge.id.clone())
    }

    /// Connect the anchor with every checked event in one direction.
    ///
    /// The batch is validated as a whole before any edge is added. Checkboxes
    /// are cleared afterwards.
    pub fn add_edges(&mut self, anchor_id_num: u32, order: EdgeOrder) -> CurationResult<Vec<EdgeId>> {
        let anchor = self
            .events
            .iter()
            .find(|e| e.id_num == anchor_id_num)
            .ok_or(CurationError::AnchorNotFound(anchor_id_num))?;
        if anchor.is_checked {
            return Err(CurationError::AnchorSelected);
        }
        let checked: Vec<&Event> = self.events.iter().filter(|e| e.is_checked).collect();
        if checked.is_empty() {
            return Err(CurationError::NoEventSelected);
        }

        let pairs: Vec<(&Event, &Event)> = checked
            .into_iter()
            .map(|e| match order {
                EdgeOrder::Precede => (e, anchor),
                EdgeOrder::Succeed => (anchor, e),
            })
            .collect();
        for (source, target) in &pairs {
            self.graph.validate_edge(&source.event_text, &target.event_text)?;
        }

        let mut ids = Vec::with_capacity(pairs.len());
        for (source, target) in pairs {
            ids.push(self.graph.add_edge(source, target)?.id.clone());
        }
        for event in self.events.iter_mut() {
            event.is_checked = false;
        }
        Ok(ids)
    }

    /// Remove the edge from `source` to `target`
    pub fn remove_edge(&mut self, source: &str, target: &str) -> CurationResult<()> {
        self.graph.remove_edge(source, target)?;
        Ok(())
    }
}
