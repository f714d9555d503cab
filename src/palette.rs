//! Palette drops: explicit node creation with a user-chosen type.

use crate::{GraphStore, Node, NodeType, Placement, Position, Result};
use tracing::{debug, warn};

/// Node type carried by a palette drop payload.
///
/// Accepts the canonical type tags plus the German palette identifiers
/// (`input`, `frage`, `antwort`, `lösung`). `generic` is not a
/// palette item. Returns `None` for anything else, including empty payloads.
pub fn parse_payload(payload: &str) -> Option<NodeType> {
    match payload.trim() {
        "start" | "input" => Some(NodeType::Start),
        "question" | "frage" => Some(NodeType::Question),
        "answer" | "antwort" => Some(NodeType::Answer),
        "solution" | "lösung" | "loesung" => Some(NodeType::Solution),
        "link" => Some(NodeType::Link),
        _ => None,
    }
}

/// Create a node for a palette drop at `pointer`.
///
/// Unrecognized payloads create nothing and return `Ok(None)`.
pub fn handle_drop(
    store: &mut GraphStore,
    payload: &str,
    pointer: Position,
    placement: &Placement,
) -> Result<Option<Node>> {
    let Some(node_type) = parse_payload(payload) else {
        warn!(payload, "ignoring drop with unknown node type");
        return Ok(None);
    };

    let position = placement.place(pointer, 0.0);
    let node = Node::with_default_label(store.generate_node_id(), node_type, position);
    store.add_node(node.clone())?;

    debug!(id = %node.id, %node_type, "node dropped from palette");
    Ok(Some(node))
}
