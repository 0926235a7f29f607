//! Schema Curator: state core of an interactive event schema authoring tool
//!
//! A schema is a partially ordered set of events. Each event carries a
//! semantic primitive (`type.subtype.subsubtype`) and argument slots whose
//! reference variables ("refvars") may be shared across events and linked to
//! knowledge-base identifiers ("qnodes").
//!
//! # Core Concepts
//!
//! - **Session**: the event list, ordering graph, selector caches and audit
//!   trail of one schema, kept mutually consistent under every edit
//! - **Selectors**: per-string disambiguation state, fetched once and pruned
//!   when nothing references the string anymore
//! - **Curator**: runs the backend calls a session needs
//!
//! # Example
//!
//! ```
//! use schema_curator::CurationSession;
//!
//! let mut session = CurationSession::new();
//! let lookups = session.add_event("buy car").unwrap();
//! assert_eq!(lookups.len(), 1);
//! ```

pub mod client;
pub mod config;
pub mod curator;
mod error;
mod graph;
pub mod integrity;
pub mod model;
pub mod selector;
mod session;
pub mod submit;

pub use client::{BackendError, CuratorBackend, HttpBackend, MockBackend, SavedSchema};
pub use config::{ConfigError, CuratorConfig};
pub use curator::{Curator, CuratorError, CuratorResult, SuggestionMode};
pub use error::{CurationError, CurationResult};
pub use graph::{Edge, EdgeId, GraphNode, SchemaGraph};
pub use model::{Arg, Event, EventPrimitive, SchemaDetails};
pub use selector::{Lookup, QnodeOption, QnodeSelector, SelectorKind};
pub use session::{CurationSession, EdgeOrder, LoadedSchema, SlotEdit};
pub use submit::{SchemaSubmission, SubmissionOutput, SubmitError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
