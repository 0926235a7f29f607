//! Referential integrity between events, args, selectors and edges
//!
//! Pure functions over borrowed state; the session calls them after every
//! mutation that can orphan a selector or an edge.

use crate::graph::{Edge, SchemaGraph};
use crate::model::{event_key, Event};
use crate::selector::{SelectorKind, Selectors};
use serde::Serialize;
use std::collections::HashSet;

/// Event texts in list order
pub fn used_event_texts(events: &[Event]) -> impl Iterator<Item = &str> {
    events.iter().map(|e| e.event_text.as_str())
}

/// Refvars bound by any arg, in event then slot order; repeats included
pub fn used_refvars(events: &[Event]) -> impl Iterator<Item = &str> {
    events.iter().flat_map(|e| e.refvars())
}

/// Whether any arg of any event still binds `refvar`
pub fn refvar_in_use(events: &[Event], refvar: &str) -> bool {
    used_refvars(events).any(|r| r == refvar)
}

/// Rebuild both selector caches from what `events` still reference.
///
/// Existing selectors are carried over untouched; nothing is fetched and
/// nothing new is created.
pub fn prune(events: &[Event], selectors: &Selectors) -> Selectors {
    Selectors {
        events: selectors.events.retain_used(used_event_texts(events)),
        refvars: selectors.refvars.retain_used(used_refvars(events)),
    }
}

/// The event whose text collides with `text`, skipping the event currently
/// named `except`
pub fn find_duplicate<'a>(events: &'a [Event], text: &str, except: Option<&str>) -> Option<&'a Event> {
    let key = event_key(text);
    events
        .iter()
        .filter(|e| except != Some(e.event_text.as_str()))
        .find(|e| e.key() == key)
}

/// Edges whose source or target is missing from `events`
pub fn dangling_edges<'a>(events: &[Event], edges: &'a [Edge]) -> Vec<&'a Edge> {
    let present: HashSet<&str> = used_event_texts(events).collect();
    edges
        .iter()
        .filter(|e| !present.contains(e.source.as_str()) || !present.contains(e.target.as_str()))
        .collect()
}

/// A broken cross-reference found by [`audit`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    DanglingEdge { id: String, source: String, target: String },
    SelfLoop { id: String, event: String },
    DuplicateEdge { id: String, source: String, target: String },
    OrphanSelector { cache: SelectorKind, query: String },
    DuplicateEvent { first: String, second: String },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::DanglingEdge { id, source, target } => {
                write!(f, "edge {} ({} -> {}) references a missing event", id, source, target)
            }
            Violation::SelfLoop { id, event } => {
                write!(f, "edge {} orders '{}' before itself", id, event)
            }
            Violation::DuplicateEdge { id, source, target } => {
                write!(f, "edge {} repeats {} -> {}", id, source, target)
            }
            Violation::OrphanSelector { cache, query } => {
                write!(f, "{} selector '{}' is no longer referenced", cache, query)
            }
            Violation::DuplicateEvent { first, second } => {
                write!(f, "events '{}' and '{}' collide", first, second)
            }
        }
    }
}

/// Check every cross-reference invariant; an empty result means consistent
pub fn audit(events: &[Event], graph: &SchemaGraph, selectors: &Selectors) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut seen: Vec<(String, &str)> = Vec::new();
    for event in events {
        let key = event.key();
        if let Some((_, first)) = seen.iter().find(|(k, _)| *k == key) {
            violations.push(Violation::DuplicateEvent {
                first: first.to_string(),
                second: event.event_text.clone(),
            });
        } else {
            seen.push((key, event.event_text.as_str()));
        }
    }

    for edge in dangling_edges(events, graph.edges()) {
        violations.push(Violation::DanglingEdge {
            id: edge.id.to_string(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        });
    }

    let mut pairs: HashSet<(&str, &str)> = HashSet::new();
    for edge in graph.edges() {
        if edge.source == edge.target {
            violations.push(Violation::SelfLoop {
                id: edge.id.to_string(),
                event: edge.source.clone(),
            });
        } else if !pairs.insert((edge.source.as_str(), edge.target.as_str())) {
            violations.push(Violation::DuplicateEdge {
                id: edge.id.to_string(),
                source: edge.source.clone(),
                target: edge.target.clone(),
            });
        }
    }

    let texts: HashSet<&str> = used_event_texts(events).collect();
    let refvars: HashSet<&str> = used_refvars(events).collect();
    for query in selectors.events.queries().filter(|q| !texts.contains(q)) {
        violations.push(Violation::OrphanSelector {
            cache: SelectorKind::Event,
            query: query.to_string(),
        });
    }
    for query in selectors.refvars.queries().filter(|q| !refvars.contains(q)) {
        violations.push(Violation::OrphanSelector {
            cache: SelectorKind::Refvar,
            query: query.to_string(),
        });
    }

    violations
}
