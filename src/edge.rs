use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an edge in the flow
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Directed connection between two nodes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Edge {
    pub id: EdgeId,

    /// Node the connection was dragged out of
    pub source: NodeId,

    /// Node the connection ends on
    pub target: NodeId,
}

impl Edge {
    /// Create a new edge
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self { id, source, target }
    }

    /// Check if this edge touches a given node
    pub fn involves(&self, node_id: &NodeId) -> bool {
        self.source == *node_id || self.target == *node_id
    }

    pub fn starts_from(&self, node_id: &NodeId) -> bool {
        self.source == *node_id
    }

    pub fn ends_at(&self, node_id: &NodeId) -> bool {
        self.target == *node_id
    }
}
