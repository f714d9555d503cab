use crate::{
    palette, validation::ValidatedStore, ConnectionGestureController, Edge, EditCommandRouter,
    EditorConfig, FlowError, GestureOutcome, GestureState, GraphStore, HandleRole, KeyValueStore,
    ModalCollaborator, Node, NodeId, PersistedFlow, PersistenceAdapter, Placement, Position,
    ReleaseTarget, Result, ValidationResult, Viewport,
};
use tracing::{debug, info, warn};

/// Input coming from the rendering collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ConnectStart { node_id: NodeId, role: HandleRole },
    ConnectEnd { pointer: Position, target: ReleaseTarget },
    Drop { payload: String, pointer: Position },
    NodeEditRequested { node_id: NodeId },
    /// The modal was confirmed with this text
    EditSaved { node_id: NodeId, input: String },
    DeleteRequested { node_id: NodeId },
    ViewportChanged(Viewport),
    ToggleSnapGrid,
    Save,
    Restore,
    Reset,
}

/// What handling an event did; the renderer re-reads the graph afterwards
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    /// Whether a connection gesture is now in progress
    Connecting(bool),
    Gesture(GestureOutcome),
    /// `None` when the payload named no known node type
    NodeDropped(Option<Node>),
    /// Whether the modal was opened
    EditorOpened(bool),
    /// New label, `None` when the node no longer exists
    LabelChanged(Option<String>),
    NodeDeleted { node: Node, edges: Vec<Edge> },
    ViewportUpdated,
    SnapGrid(bool),
    Saved,
    /// `false` when nothing was stored yet and the graph was kept
    Restored(bool),
    Reset,
}

/// Single-threaded editing session over one flow.
///
/// Owns the graph, the viewport and the session-only settings. Every event
/// runs to completion before the next one is handled.
pub struct FlowEditor<S: KeyValueStore> {
    config: EditorConfig,
    store: GraphStore,
    viewport: Viewport,

    /// Session-scoped, never persisted
    snap_to_grid: bool,

    gesture: ConnectionGestureController,
    edits: EditCommandRouter,
    persistence: PersistenceAdapter<S>,
    modal: Option<Box<dyn ModalCollaborator>>,
}

impl<S: KeyValueStore> FlowEditor<S> {
    /// Session with default settings, starting from the canonical fresh graph
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, EditorConfig::default())
    }

    pub fn with_config(storage: S, config: EditorConfig) -> Self {
        let mut store = GraphStore::with_event_capacity(config.event_capacity);
        let start_id = store.generate_node_id();
        let initial = PersistedFlow::initial(start_id, config.start_position, config.default_viewport);
        if let Err(e) = store.replace_all(initial.nodes, initial.edges) {
            warn!(error = %e, "could not seed the initial graph");
        }

        Self {
            gesture: ConnectionGestureController::new(config.spawn_offset()),
            edits: EditCommandRouter::new(),
            persistence: PersistenceAdapter::new(storage, &config),
            viewport: initial.viewport,
            snap_to_grid: config.snap_to_grid,
            modal: None,
            store,
            config,
        }
    }

    /// Use a seeded router so edited labels are reproducible
    pub fn with_edit_seed(mut self, seed: u64) -> Self {
        self.edits = EditCommandRouter::with_seed(seed);
        self
    }

    pub fn set_modal(&mut self, modal: Box<dyn ModalCollaborator>) {
        self.modal = Some(modal);
    }

    // ========== Renderer Surface ==========

    pub fn graph(&self) -> &GraphStore {
        &self.store
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn snap_to_grid(&self) -> bool {
        self.snap_to_grid
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    pub fn gesture(&self) -> &ConnectionGestureController {
        &self.gesture
    }

    pub fn validate(&self) -> ValidationResult {
        self.store.validate()
    }

    fn placement(&self) -> Placement {
        let grid = self.snap_to_grid.then_some(self.config.snap_grid);
        Placement::new(self.viewport, grid)
    }

    // ========== Event Dispatch ==========

    /// Route one renderer event
    pub fn handle(&mut self, event: EditorEvent) -> Result<EditorOutcome> {
        match event {
            EditorEvent::ConnectStart { node_id, role } => {
                Ok(EditorOutcome::Connecting(self.connect_start(node_id, role)))
            }
            EditorEvent::ConnectEnd { pointer, target } => {
                self.connect_end(pointer, target).map(EditorOutcome::Gesture)
            }
            EditorEvent::Drop { payload, pointer } => {
                self.drop_node(&payload, pointer).map(EditorOutcome::NodeDropped)
            }
            EditorEvent::NodeEditRequested { node_id } => {
                Ok(EditorOutcome::EditorOpened(self.request_edit(&node_id)))
            }
            EditorEvent::EditSaved { node_id, input } => {
                Ok(EditorOutcome::LabelChanged(self.save_edit(&node_id, &input)))
            }
            EditorEvent::DeleteRequested { node_id } => {
                let (node, edges) = self.delete_node(&node_id)?;
                Ok(EditorOutcome::NodeDeleted { node, edges })
            }
            EditorEvent::ViewportChanged(viewport) => {
                self.set_viewport(viewport);
                Ok(EditorOutcome::ViewportUpdated)
            }
            EditorEvent::ToggleSnapGrid => Ok(EditorOutcome::SnapGrid(self.toggle_snap_grid())),
            EditorEvent::Save => self.save().map(|_| EditorOutcome::Saved),
            EditorEvent::Restore => self.restore().map(EditorOutcome::Restored),
            EditorEvent::Reset => self.reset().map(|_| EditorOutcome::Reset),
        }
    }

    // ========== Operations ==========

    /// Returns whether a gesture is now in progress
    pub fn connect_start(&mut self, node_id: NodeId, role: HandleRole) -> bool {
        self.gesture.connect_start(node_id, role, &self.store);
        self.gesture.state() != &GestureState::Idle
    }

    pub fn connect_end(&mut self, pointer: Position, target: ReleaseTarget) -> Result<GestureOutcome> {
        let placement = self.placement();
        self.gesture
            .connect_end(pointer, target, &mut self.store, &placement)
    }

    pub fn drop_node(&mut self, payload: &str, pointer: Position) -> Result<Option<Node>> {
        let placement = self.placement();
        palette::handle_drop(&mut self.store, payload, pointer, &placement)
    }

    /// Open the modal for a node; `false` if there is no modal or no such node
    pub fn request_edit(&mut self, node_id: &NodeId) -> bool {
        let Some(modal) = self.modal.as_deref_mut() else {
            warn!(id = %node_id, "edit requested but no modal is attached");
            return false;
        };
        self.edits.open_editor(&self.store, node_id, modal)
    }

    pub fn save_edit(&mut self, node_id: &NodeId, input: &str) -> Option<String> {
        self.edits.on_save(&mut self.store, node_id, input)
    }

    pub fn delete_node(&mut self, node_id: &NodeId) -> Result<(Node, Vec<Edge>)> {
        self.edits.on_delete(&mut self.store, node_id)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Flip snap-to-grid and return the new state
    pub fn toggle_snap_grid(&mut self) -> bool {
        self.snap_to_grid = !self.snap_to_grid;
        debug!(enabled = self.snap_to_grid, "snap to grid toggled");
        self.snap_to_grid
    }

    pub fn save(&mut self) -> Result<()> {
        self.persistence.save(&self.store, self.viewport)
    }

    /// Replace the session with the stored flow.
    ///
    /// Returns `false` when nothing is stored. On any error the current graph
    /// and viewport stay as they are.
    pub fn restore(&mut self) -> Result<bool> {
        let Some(flow) = self.persistence.restore()? else {
            return Ok(false);
        };

        self.store
            .replace_all(flow.nodes, flow.edges)
            .map_err(|e| match e {
                FlowError::DuplicateId { .. } | FlowError::DanglingReference { .. } => {
                    warn!(error = %e, "stored flow is inconsistent");
                    FlowError::corrupt(e.to_string())
                }
                other => other,
            })?;

        self.viewport = flow.viewport;
        self.gesture = ConnectionGestureController::new(self.config.spawn_offset());
        Ok(true)
    }

    /// Drop the stored flow and start over from the canonical fresh graph
    pub fn reset(&mut self) -> Result<()> {
        let start_id = self.store.generate_node_id();
        let flow = self.persistence.reset(start_id)?;

        self.store.clear_events();
        self.store.replace_all(flow.nodes, flow.edges)?;
        self.viewport = flow.viewport;
        self.gesture = ConnectionGestureController::new(self.config.spawn_offset());

        info!("editor reset");
        Ok(())
    }
}
