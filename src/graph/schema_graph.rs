//! SchemaGraph: nodes and ordering edges of a schema under construction

use super::edge::Edge;
use super::node::GraphNode;
use crate::error::{CurationError, CurationResult};
use crate::model::Event;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The ordering graph of a schema.
///
/// Nodes mirror events and are rebuilt from the event list when it is
/// finalized; edges are created explicitly and must only reference events
/// that still exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from edges only; nodes arrive at the next rebuild
    pub fn with_edges(edges: Vec<Edge>) -> Self {
        Self {
            nodes: Vec::new(),
            edges,
        }
    }

    /// Get all nodes
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Get all edges
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Exact directional lookup; `b -> a` does not match `a -> b`
    pub fn edge_exists(&self, source: &str, target: &str) -> bool {
        self.edges.iter().any(|e| e.is(source, target))
    }

    /// Add a node unless one with the same id is already present
    pub fn add_node(&mut self, node: GraphNode) {
        if !self.has_node(&node.id) {
            self.nodes.push(node);
        }
    }

    /// Check that an edge from `source` to `target` may be added
    pub fn validate_edge(&self, source: &str, target: &str) -> CurationResult<()> {
        if source == target {
            return Err(CurationError::SelfLoop(source.to_string()));
        }
        if self.edge_exists(source, target) {
            return Err(CurationError::DuplicateEdge {
                from: source.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }

    /// Add an ordering edge, rejecting self-loops and exact duplicates
    pub fn add_edge(&mut self, source: &Event, target: &Event) -> CurationResult<&Edge> {
        self.validate_edge(&source.event_text, &target.event_text)?;
        self.edges.push(Edge::new(source, target));
        Ok(&self.edges[self.edges.len() - 1])
    }

    /// Remove the edge from `source` to `target`
    pub fn remove_edge(&mut self, source: &str, target: &str) -> CurationResult<Edge> {
        match self.edges.iter().position(|e| e.is(source, target)) {
            Some(idx) => Ok(self.edges.remove(idx)),
            None => Err(CurationError::EdgeNotFound {
                from: source.to_string(),
                to: target.to_string(),
            }),
        }
    }

    /// Remove an event's node and every edge touching it.
    ///
    /// Returns the number of edges removed.
    pub fn remove_event(&mut self, event_text: &str) -> usize {
        self.nodes.retain(|n| n.id != event_text);
        let before = self.edges.len();
        self.edges = std::mem::take(&mut self.edges)
            .into_iter()
            .filter(|e| !e.touches(event_text))
            .collect();
        before - self.edges.len()
    }

    /// Rebuild nodes from `events` and drop edges left dangling.
    ///
    /// Returns the number of edges removed.
    pub fn rebuild(&mut self, events: &[Event]) -> usize {
        self.nodes = events.iter().map(GraphNode::from).collect();
        self.prune_dangling(events)
    }

    /// Drop every edge whose source or target is not one of `events`.
    ///
    /// Returns the number of edges removed.
    pub fn prune_dangling(&mut self, events: &[Event]) -> usize {
        let present: HashSet<&str> = events.iter().map(|e| e.event_text.as_str()).collect();
        let before = self.edges.len();
        self.edges = std::mem::take(&mut self.edges)
            .into_iter()
            .filter(|e| present.contains(e.source.as_str()) && present.contains(e.target.as_str()))
            .collect();
        self.nodes.retain(|n| present.contains(n.id.as_str()));
        before - self.edges.len()
    }

    /// Carry the node and edges of `old_text` over to the renamed `event`.
    ///
    /// The node takes the event's current display id as its label.
    pub fn rename(&mut self, old_text: &str, event: &Event) {
        let new_text = event.event_text.as_str();
        for node in self.nodes.iter_mut().filter(|n| n.id == old_text) {
            *node = GraphNode::from(event);
        }
        for edge in self.edges.iter_mut() {
            if edge.source == old_text {
                edge.source = new_text.to_string();
            }
            if edge.target == old_text {
                edge.target = new_text.to_string();
            }
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(texts: &[&str]) -> Vec<Event> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Event::new(*t, i as u32 + 1))
            .collect()
    }

    #[test]
    fn add_edge_assigns_sequence_id() {
        let evs = events(&["buy", "sell"]);
        let mut graph = SchemaGraph::new();
        let edge = graph.add_edge(&evs[0], &evs[1]).unwrap();
        assert_eq!(edge.id.as_str(), "E1-E2");
        assert_eq!(edge.source, "buy");
        assert_eq!(edge.target, "sell");
    }

    #[test]
    fn add_edge_rejects_self_loop() {
        let evs = events(&["buy"]);
        let mut graph = SchemaGraph::new();
        let err = graph.add_edge(&evs[0], &evs[0]).unwrap_err();
        assert!(matches!(err, CurationError::SelfLoop(_)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn duplicates_are_directional() {
        let evs = events(&["buy", "sell"]);
        let mut graph = SchemaGraph::new();
        graph.add_edge(&evs[0], &evs[1]).unwrap();

        let err = graph.add_edge(&evs[0], &evs[1]).unwrap_err();
        assert!(matches!(err, CurationError::DuplicateEdge { .. }));
        assert_eq!(err.to_string(), "Edge between 'buy' and 'sell' already exists");
        assert!(std::error::Error::source(&err).is_none());

        // The reverse direction is a different edge
        graph.add_edge(&evs[1], &evs[0]).unwrap();
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn remove_event_drops_node_and_touching_edges() {
        let evs = events(&["buy", "sell", "ship"]);
        let mut graph = SchemaGraph::new();
        graph.rebuild(&evs);
        graph.add_edge(&evs[0], &evs[1]).unwrap();
        graph.add_edge(&evs[1], &evs[2]).unwrap();
        graph.add_edge(&evs[0], &evs[2]).unwrap();

        let removed = graph.remove_event("buy");
        assert_eq!(removed, 2);
        assert!(!graph.has_node("buy"));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edge_exists("sell", "ship"));
    }

    #[test]
    fn remove_event_handles_adjacent_matches() {
        // Consecutive matching edges must all be removed
        let evs = events(&["a", "b", "c"]);
        let mut graph = SchemaGraph::new();
        graph.add_edge(&evs[0], &evs[1]).unwrap();
        graph.add_edge(&evs[0], &evs[2]).unwrap();
        graph.add_edge(&evs[1], &evs[0]).unwrap();
        assert_eq!(graph.remove_event("a"), 3);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn rebuild_prunes_dangling_edges() {
        let evs = events(&["buy", "sell"]);
        let mut graph = SchemaGraph::new();
        graph.add_edge(&evs[0], &evs[1]).unwrap();

        let removed = graph.rebuild(&evs[1..]);
        assert_eq!(removed, 1);
        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.nodes()[0].id, "sell");
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn remove_edge_reports_missing() {
        let evs = events(&["buy", "sell"]);
        let mut graph = SchemaGraph::new();
        graph.add_edge(&evs[0], &evs[1]).unwrap();
        assert!(graph.remove_edge("sell", "buy").is_err());
        assert!(graph.remove_edge("buy", "sell").is_ok());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn rename_rewrites_endpoints() {
        let evs = events(&["buy", "sell"]);
        let mut graph = SchemaGraph::new();
        graph.rebuild(&evs);
        graph.add_edge(&evs[0], &evs[1]).unwrap();
        let mut renamed = evs[0].clone();
        renamed.event_text = "purchase".to_string();
        renamed.id = Some("E1 - purchase".to_string());
        graph.rename("buy", &renamed);
        assert!(graph.edge_exists("purchase", "sell"));
        assert!(graph.has_node("purchase"));
        assert!(!graph.has_node("buy"));
        assert_eq!(graph.nodes()[0].label.as_deref(), Some("E1 - purchase"));
    }
}
