use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node in the flow
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A typed, labeled vertex placed on the canvas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Unique identifier within the graph
    pub id: NodeId,

    /// Node type selects the renderer and the connectors the node offers
    pub node_type: NodeType,

    /// Top-left corner in canvas coordinates
    pub position: Position,

    /// Text shown inside the node
    pub label: String,
}

impl Node {
    /// Create a new node
    pub fn new(id: NodeId, node_type: NodeType, position: Position, label: impl Into<String>) -> Self {
        Self {
            id,
            node_type,
            position,
            label: label.into(),
        }
    }

    /// Create a node carrying the default label for its type
    pub fn with_default_label(id: NodeId, node_type: NodeType, position: Position) -> Self {
        Self::new(id, node_type, position, node_type.default_label())
    }

    /// Update the node's label
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }
}

/// Point on the canvas (or on the editing surface, before projection)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Round to the nearest multiple of the grid cell on each axis
    pub fn snapped(self, grid: [f64; 2]) -> Self {
        let snap = |value: f64, step: f64| {
            if step > 0.0 {
                (value / step).round() * step
            } else {
                value
            }
        };
        Self {
            x: snap(self.x, grid[0]),
            y: snap(self.y, grid[1]),
        }
    }
}

/// Closed set of node kinds the editor knows about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Start,
    Question,
    Answer,
    Solution,
    Link,
    /// Fallback for implicitly created nodes whose source could not be resolved
    Generic,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::Start,
        NodeType::Question,
        NodeType::Answer,
        NodeType::Solution,
        NodeType::Link,
        NodeType::Generic,
    ];

    /// Tag used in the persisted document and in palette payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Start => "start",
            NodeType::Question => "question",
            NodeType::Answer => "answer",
            NodeType::Solution => "solution",
            NodeType::Link => "link",
            NodeType::Generic => "generic",
        }
    }

    /// Parse a persisted type tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Label given to a freshly created node of this type
    pub fn default_label(&self) -> String {
        match self {
            NodeType::Start => "Start".to_string(),
            other => format!("{} node", other.as_str()),
        }
    }

    /// Whether connections can be dragged out of this node
    pub fn has_outgoing_connector(&self) -> bool {
        !matches!(self, NodeType::Solution | NodeType::Link)
    }

    /// Whether connections can end on this node
    pub fn has_incoming_connector(&self) -> bool {
        !matches!(self, NodeType::Start)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = Node::new(
            NodeId::new("dndnode_1"),
            NodeType::Question,
            Position::new(10.0, 20.0),
            "How old are you?",
        );

        assert_eq!(node.id.as_str(), "dndnode_1");
        assert_eq!(node.node_type, NodeType::Question);
        assert_eq!(node.position, Position::new(10.0, 20.0));
        assert_eq!(node.label, "How old are you?");
    }

    #[test]
    fn test_default_labels() {
        assert_eq!(NodeType::Start.default_label(), "Start");
        assert_eq!(NodeType::Answer.default_label(), "answer node");

        let node = Node::with_default_label(
            NodeId::new("n"),
            NodeType::Solution,
            Position::default(),
        );
        assert_eq!(node.label, "solution node");
    }

    #[test]
    fn test_type_tags() {
        for node_type in NodeType::ALL {
            assert_eq!(NodeType::from_tag(node_type.as_str()), Some(node_type));
        }
        assert_eq!(NodeType::from_tag("frage"), None);
        assert_eq!(NodeType::from_tag(""), None);
    }

    #[test]
    fn test_connectors() {
        assert!(NodeType::Start.has_outgoing_connector());
        assert!(!NodeType::Start.has_incoming_connector());

        assert!(NodeType::Question.has_outgoing_connector());
        assert!(NodeType::Answer.has_incoming_connector());

        assert!(!NodeType::Solution.has_outgoing_connector());
        assert!(NodeType::Solution.has_incoming_connector());
        assert!(!NodeType::Link.has_outgoing_connector());
    }

    #[test]
    fn test_snapping() {
        let pos = Position::new(22.0, 38.0).snapped([15.0, 15.0]);
        assert_eq!(pos, Position::new(15.0, 45.0));

        // zero-sized grid leaves the axis alone
        let pos = Position::new(22.0, 38.0).snapped([0.0, 10.0]);
        assert_eq!(pos, Position::new(22.0, 40.0));
    }

    #[test]
    fn test_set_label() {
        let mut node = Node::with_default_label(NodeId::new("n"), NodeType::Answer, Position::default());
        node.set_label("answer_ab12");
        assert_eq!(node.label, "answer_ab12");
        assert_eq!(node.node_type, NodeType::Answer);
    }
}
