/// Identifier generator for nodes and edges.
/// Produces prefixed ULIDs like "dndnode_01J9ZQ..." that sort by creation time.
/// Ids are monotonic within one generator, so nothing it hands out repeats.

use crate::{EdgeId, NodeId};
use ulid::Ulid;

pub const NODE_ID_PREFIX: &str = "dndnode_";
pub const EDGE_ID_PREFIX: &str = "edge_";

#[derive(Debug, Clone)]
pub struct IdGenerator {
    /// Last ULID handed out
    last: Option<Ulid>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Generate a node id for which `is_taken` returns false
    pub fn next_node_id(&mut self, is_taken: impl Fn(&NodeId) -> bool) -> NodeId {
        loop {
            let id = NodeId::new(format!("{}{}", NODE_ID_PREFIX, self.next_ulid()));
            if !is_taken(&id) {
                return id;
            }
        }
    }

    /// Generate an edge id for which `is_taken` returns false
    pub fn next_edge_id(&mut self, is_taken: impl Fn(&EdgeId) -> bool) -> EdgeId {
        loop {
            let id = EdgeId::new(format!("{}{}", EDGE_ID_PREFIX, self.next_ulid()));
            if !is_taken(&id) {
                return id;
            }
        }
    }

    fn next_ulid(&mut self) -> Ulid {
        let fresh = Ulid::new();
        let next = match self.last {
            // Same millisecond (or clock went backwards): bump the previous one
            Some(last) if fresh <= last => last.increment().unwrap_or(fresh),
            _ => fresh,
        };
        self.last = Some(next);
        next
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
