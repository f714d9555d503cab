use crate::{
    Edge, EdgeId, EventType, FlowError, GraphEvent, IdGenerator, Node, NodeId, NodeType, Result,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Events kept by default before the oldest are dropped
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Authoritative node and edge collections of the flow being edited
#[derive(Debug, Clone)]
pub struct GraphStore {
    /// All nodes indexed by ID
    nodes: HashMap<NodeId, Node>,

    /// All edges indexed by ID
    edges: HashMap<EdgeId, Edge>,

    ids: IdGenerator,

    /// Event log for history tracking, oldest first
    events: Vec<GraphEvent>,

    /// Most events kept in the log
    event_capacity: usize,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl GraphStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store keeping at most `capacity` events
    pub fn with_event_capacity(capacity: usize) -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            ids: IdGenerator::new(),
            events: Vec::new(),
            event_capacity: capacity,
        }
    }

    // ========== Id Generation ==========

    /// Fresh node id, unused in this graph and never issued before
    pub fn generate_node_id(&mut self) -> NodeId {
        let nodes = &self.nodes;
        self.ids.next_node_id(|id| nodes.contains_key(id))
    }

    /// Fresh edge id, unused in this graph and never issued before
    pub fn generate_edge_id(&mut self) -> EdgeId {
        let edges = &self.edges;
        self.ids.next_edge_id(|id| edges.contains_key(id))
    }

    // ========== Node Operations ==========

    /// Insert a node
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(FlowError::DuplicateId {
                id: node.id.to_string(),
            });
        }

        debug!(id = %node.id, node_type = %node.node_type, "node added");
        self.log_event(EventType::NodeCreated {
            id: node.id.clone(),
            node_type: node.node_type,
            position: node.position,
        });

        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Get a node by ID
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> &HashMap<NodeId, Node> {
        &self.nodes
    }

    /// Replace a node's label, keeping id, type and position.
    ///
    /// Returns `false` when no node has this id; that is not an error.
    pub fn update_node_label(&mut self, id: &NodeId, new_label: impl Into<String>) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            debug!(id = %id, "label update for missing node ignored");
            return false;
        };

        let new_label = new_label.into();
        let old_label = std::mem::replace(&mut node.label, new_label.clone());

        self.log_event(EventType::LabelChanged {
            id: id.clone(),
            old_label,
            new_label,
        });
        true
    }

    /// Delete a node and every edge that starts or ends at it
    pub fn remove_node(&mut self, id: &NodeId) -> Result<(Node, Vec<Edge>)> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| FlowError::NodeNotFound { id: id.to_string() })?;

        let incident: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.involves(id))
            .map(|e| e.id.clone())
            .collect();

        let removed: Vec<Edge> = incident
            .iter()
            .filter_map(|edge_id| self.edges.remove(edge_id))
            .collect();

        debug!(id = %id, edges = removed.len(), "node removed");
        self.log_event(EventType::NodeRemoved {
            id: id.clone(),
            cascaded_edges: incident,
        });

        Ok((node, removed))
    }

    /// First node of type `start`, if any
    pub fn start_node(&self) -> Option<&Node> {
        self.nodes
            .values()
            .find(|n| n.node_type == NodeType::Start)
    }

    // ========== Edge Operations ==========

    /// Insert an edge; both endpoints must already exist
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        if self.edges.contains_key(&edge.id) {
            return Err(FlowError::DuplicateId {
                id: edge.id.to_string(),
            });
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(FlowError::DanglingReference {
                    edge_id: edge.id.to_string(),
                    missing: endpoint.to_string(),
                });
            }
        }

        debug!(id = %edge.id, source = %edge.source, target = %edge.target, "edge added");
        self.log_event(EventType::EdgeCreated {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        });

        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    /// Get an edge by ID
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Get all edges
    pub fn edges(&self) -> &HashMap<EdgeId, Edge> {
        &self.edges
    }

    /// Delete a single edge
    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<Edge> {
        let edge = self
            .edges
            .remove(id)
            .ok_or_else(|| FlowError::EdgeNotFound { id: id.to_string() })?;

        self.log_event(EventType::EdgeRemoved { id: id.clone() });
        Ok(edge)
    }

    /// Get all edges starting from a node
    pub fn outgoing_edges(&self, from: &NodeId) -> Vec<&Edge> {
        self.edges.values().filter(|e| e.starts_from(from)).collect()
    }

    /// Get all edges ending at a node
    pub fn incoming_edges(&self, to: &NodeId) -> Vec<&Edge> {
        self.edges.values().filter(|e| e.ends_at(to)).collect()
    }

    // ========== Bulk Replacement ==========

    /// Swap the entire graph contents.
    ///
    /// The incoming nodes and edges are checked for duplicate ids and dangling
    /// endpoints first; on failure the current graph is left as it was.
    pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<()> {
        let mut node_map = HashMap::with_capacity(nodes.len());
        for node in nodes {
            if node_map.contains_key(&node.id) {
                return Err(FlowError::DuplicateId {
                    id: node.id.to_string(),
                });
            }
            node_map.insert(node.id.clone(), node);
        }

        let mut edge_ids = HashSet::with_capacity(edges.len());
        for edge in &edges {
            if !edge_ids.insert(&edge.id) {
                return Err(FlowError::DuplicateId {
                    id: edge.id.to_string(),
                });
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_map.contains_key(endpoint) {
                    return Err(FlowError::DanglingReference {
                        edge_id: edge.id.to_string(),
                        missing: endpoint.to_string(),
                    });
                }
            }
        }

        self.nodes = node_map;
        self.edges = edges.into_iter().map(|e| (e.id.clone(), e)).collect();

        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "graph replaced"
        );
        self.log_event(EventType::GraphReplaced {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
        });

        Ok(())
    }

    // ========== Event Logging ==========

    fn log_event(&mut self, event: EventType) {
        if self.event_capacity == 0 {
            return;
        }
        if self.events.len() >= self.event_capacity {
            let overflow = self.events.len() + 1 - self.event_capacity;
            self.events.drain(..overflow);
        }
        self.events.push(GraphEvent::new(event));
    }

    /// Most recent events, oldest first, up to the store's event capacity
    pub fn events(&self) -> &[GraphEvent] {
        &self.events
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    /// Clear event log
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    // ========== Utility Methods ==========

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
