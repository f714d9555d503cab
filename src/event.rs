use crate::{EdgeId, NodeId, NodeType, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A graph event with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl GraphEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Mutations recorded by the graph store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EventType {
    NodeCreated {
        id: NodeId,
        node_type: NodeType,
        position: Position,
    },

    EdgeCreated {
        id: EdgeId,
        source: NodeId,
        target: NodeId,
    },

    LabelChanged {
        id: NodeId,
        old_label: String,
        new_label: String,
    },

    NodeRemoved {
        id: NodeId,
        /// Edges removed along with the node
        cascaded_edges: Vec<EdgeId>,
    },

    EdgeRemoved {
        id: EdgeId,
    },

    /// Whole graph swapped by restore or reset
    GraphReplaced {
        node_count: usize,
        edge_count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = GraphEvent::new(EventType::NodeCreated {
            id: NodeId::new("dndnode_1"),
            node_type: NodeType::Question,
            position: Position::new(0.0, 0.0),
        });

        assert!(event.timestamp <= Utc::now());
    }

    #[test]
    fn test_event_serialization() {
        let event = GraphEvent::new(EventType::EdgeCreated {
            id: EdgeId::new("edge_1"),
            source: NodeId::new("a"),
            target: NodeId::new("b"),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: GraphEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.event, event.event);
    }
}
