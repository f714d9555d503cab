//! Error types for flow editing operations.

use thiserror::Error;

/// Result type alias for flow editor operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Errors surfaced by the graph store, persistence and configuration layers.
///
/// Gesture-level problems (wrong connector role, abandoned drag, unknown
/// palette payload) are not errors and never show up here.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A node or edge with this id already exists.
    #[error("Duplicate id: {id}")]
    DuplicateId { id: String },

    /// An edge endpoint does not reference an existing node.
    #[error("Edge {edge_id} references missing node: {missing}")]
    DanglingReference { edge_id: String, missing: String },

    /// Node not found in the graph
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// Edge not found in the graph
    #[error("Edge not found: {id}")]
    EdgeNotFound { id: String },

    /// The persisted document could not be understood.
    #[error("Corrupt persisted state: {reason}")]
    CorruptState { reason: String },

    /// A coordinate is NaN or infinite and cannot be written out.
    #[error("Non-finite coordinate in {what}")]
    NonFiniteCoordinate { what: String },

    /// The durable storage could not be reached.
    #[error("Storage unavailable for key '{key}'")]
    StorageUnavailable {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be read or parsed
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl FlowError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        FlowError::CorruptState {
            reason: reason.into(),
        }
    }

    pub(crate) fn storage(key: &str, source: std::io::Error) -> Self {
        FlowError::StorageUnavailable {
            key: key.to_string(),
            source,
        }
    }

    /// Whether the caller can keep its in-memory graph and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FlowError::CorruptState { .. }
                | FlowError::NonFiniteCoordinate { .. }
                | FlowError::StorageUnavailable { .. }
        )
    }
}
