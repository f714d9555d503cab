//! Connection gesture state machine.
//!
//! A gesture starts when the pointer goes down on a node's outgoing connector
//! and ends on release. Releasing on another node's incoming connector adds an edge;
//! releasing on empty canvas spawns a node of the inferred type plus the edge
//! leading to it. Anything else abandons the gesture without touching the
//! store.

use crate::{inference, Edge, FlowError, GraphStore, Node, NodeId, Placement, Position, Result};
use tracing::{debug, warn};

/// Which side of a node a connector belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleRole {
    /// Outgoing connector, where connections are dragged out
    Source,
    /// Incoming connector, where connections end
    Target,
}

/// What the pointer was over when the gesture was released
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseTarget {
    /// A connector of the given node
    Connector { node_id: NodeId, role: HandleRole },
    /// Empty canvas inside the editing surface
    Pane,
    /// Outside the editing surface
    OutsideSurface,
    /// Anything else the renderer hit (node body, controls, panels)
    Other,
}

impl ReleaseTarget {
    /// Release on a node's incoming connector
    pub fn incoming(node_id: NodeId) -> Self {
        ReleaseTarget::Connector {
            node_id,
            role: HandleRole::Target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Connecting(NodeId),
}

/// Why a released gesture did not change the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    /// No source was captured on connect start
    NotConnecting,
    /// Released on the node the gesture started from
    SelfConnection,
    /// Released on a node that accepts no incoming connections
    NoIncomingConnector,
    /// Released on another node's outgoing connector
    WrongConnector,
    /// Source and target are already connected
    AlreadyConnected,
    OutsideSurface,
    InvalidTarget,
}

/// Result of a finished gesture
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    EdgeCreated(Edge),
    NodeSpawned { node: Node, edge: Edge },
    Abandoned(AbandonReason),
}

impl GestureOutcome {
    pub fn is_abandoned(&self) -> bool {
        matches!(self, GestureOutcome::Abandoned(_))
    }
}

/// Drives a single connection gesture at a time
#[derive(Debug, Clone, Default)]
pub struct ConnectionGestureController {
    state: GestureState,

    /// Horizontal shift applied to spawned nodes (half the node width)
    spawn_offset: f64,
}

impl ConnectionGestureController {
    pub fn new(spawn_offset: f64) -> Self {
        Self {
            state: GestureState::Idle,
            spawn_offset,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Pointer went down on a connector.
    ///
    /// Only an outgoing connector of a node that offers one starts a gesture;
    /// anything else leaves the controller idle so the release does nothing.
    pub fn connect_start(&mut self, node_id: NodeId, role: HandleRole, store: &GraphStore) {
        if role != HandleRole::Source {
            warn!(node = %node_id, ?role, "connection started on a non-outgoing connector");
            self.state = GestureState::Idle;
            return;
        }

        if let Some(node) = store.node(&node_id) {
            if !node.node_type.has_outgoing_connector() {
                warn!(node = %node_id, node_type = %node.node_type, "node has no outgoing connector");
                self.state = GestureState::Idle;
                return;
            }
        }

        debug!(source = %node_id, "connection gesture started");
        self.state = GestureState::Connecting(node_id);
    }

    /// Pointer released; resolves the gesture and returns to idle.
    ///
    /// Store errors (a source or target that vanished mid-gesture) are
    /// returned before anything is inserted.
    pub fn connect_end(
        &mut self,
        pointer: Position,
        target: ReleaseTarget,
        store: &mut GraphStore,
        placement: &Placement,
    ) -> Result<GestureOutcome> {
        let state = std::mem::take(&mut self.state);
        let GestureState::Connecting(source) = state else {
            debug!("release without a captured source");
            return Ok(GestureOutcome::Abandoned(AbandonReason::NotConnecting));
        };

        let outcome = match target {
            ReleaseTarget::Connector {
                role: HandleRole::Source,
                ..
            } => GestureOutcome::Abandoned(AbandonReason::WrongConnector),
            ReleaseTarget::Connector { node_id, .. } => {
                Self::connect_existing(store, source, node_id)?
            }
            ReleaseTarget::Pane => {
                let position = placement.place(pointer, self.spawn_offset);
                Self::spawn_connected(store, source, position)?
            }
            ReleaseTarget::OutsideSurface => GestureOutcome::Abandoned(AbandonReason::OutsideSurface),
            ReleaseTarget::Other => GestureOutcome::Abandoned(AbandonReason::InvalidTarget),
        };

        if let GestureOutcome::Abandoned(reason) = &outcome {
            debug!(?reason, "connection gesture abandoned");
        }
        Ok(outcome)
    }

    fn connect_existing(
        store: &mut GraphStore,
        source: NodeId,
        target: NodeId,
    ) -> Result<GestureOutcome> {
        if source == target {
            return Ok(GestureOutcome::Abandoned(AbandonReason::SelfConnection));
        }
        if let Some(node) = store.node(&target) {
            if !node.node_type.has_incoming_connector() {
                return Ok(GestureOutcome::Abandoned(AbandonReason::NoIncomingConnector));
            }
        }
        if store
            .outgoing_edges(&source)
            .iter()
            .any(|e| e.target == target)
        {
            return Ok(GestureOutcome::Abandoned(AbandonReason::AlreadyConnected));
        }

        let edge = Edge::new(store.generate_edge_id(), source, target);
        store.add_edge(edge.clone())?;
        Ok(GestureOutcome::EdgeCreated(edge))
    }

    fn spawn_connected(
        store: &mut GraphStore,
        source: NodeId,
        position: Position,
    ) -> Result<GestureOutcome> {
        let node_type = inference::infer_from(store, &source);

        let node_id = store.generate_node_id();
        let edge_id = store.generate_edge_id();

        // Both endpoints must be resolvable before anything is inserted
        if store.node(&source).is_none() {
            return Err(FlowError::DanglingReference {
                edge_id: edge_id.to_string(),
                missing: source.to_string(),
            });
        }

        let node = Node::with_default_label(node_id.clone(), node_type, position);
        let edge = Edge::new(edge_id, source, node_id);

        store.add_node(node.clone())?;
        store.add_edge(edge.clone())?;

        Ok(GestureOutcome::NodeSpawned { node, edge })
    }
}
