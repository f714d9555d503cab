// Flow Editor - Core Library
//
// Graph-editing engine behind a question/answer flow builder. A rendering
// front end feeds pointer and toolbar events into `FlowEditor` and re-reads
// the graph after each one.

pub mod config;
pub mod edge;
pub mod edit;
pub mod editor;
pub mod error;
pub mod event;
pub mod gesture;
pub mod id_generator;
pub mod inference;
pub mod node;
pub mod palette;
pub mod persistence;
pub mod store;
pub mod validation;
pub mod viewport;

// Re-export main types for convenience
pub use config::EditorConfig;
pub use edge::{Edge, EdgeId};
pub use edit::{EditCommandRouter, EditRequest, ModalCollaborator};
pub use editor::{EditorEvent, EditorOutcome, FlowEditor};
pub use error::{FlowError, Result};
pub use event::{EventType, GraphEvent};
pub use gesture::{
    AbandonReason, ConnectionGestureController, GestureOutcome, GestureState, HandleRole,
    ReleaseTarget,
};
pub use id_generator::IdGenerator;
pub use node::{Node, NodeId, NodeType, Position};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, PersistedFlow, PersistenceAdapter};
pub use store::GraphStore;
pub use validation::{
    ValidatedStore, ValidationIssue, ValidationIssueType, ValidationResult, ValidationSeverity,
};
pub use viewport::{Placement, Viewport};
