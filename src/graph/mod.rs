//! Ordering graph of a schema

mod edge;
mod node;
mod schema_graph;


pub use edge::{Edge, EdgeId};
pub use node::GraphNode;
pub use schema_graph::SchemaGraph;
