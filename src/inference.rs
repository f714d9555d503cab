//! Type choice for nodes spawned by dropping a connection on empty canvas.
//!
//! Authoring alternates between questions and answers: extending a question
//! yields an answer, extending anything else yields a question.

use crate::{GraphStore, NodeId, NodeType};

/// Type of the node created when extending a node of type `source`.
///
/// `None` means the source node could not be resolved; the result is then
/// [`NodeType::Generic`].
pub fn infer(source: Option<NodeType>) -> NodeType {
    match source {
        Some(NodeType::Question) => NodeType::Answer,
        Some(_) => NodeType::Question,
        None => NodeType::Generic,
    }
}

/// Same as [`infer`], looking the source node up in the store.
pub fn infer_from(store: &GraphStore, source: &NodeId) -> NodeType {
    infer(store.node(source).map(|n| n.node_type))
}
