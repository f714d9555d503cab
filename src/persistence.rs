use crate::{
    Edge, EdgeId, EditorConfig, FlowError, GraphStore, Node, NodeId, NodeType, Position, Result,
    Viewport,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Whether `key` can name a stored document.
///
/// Keys are non-empty, made of ASCII letters, digits, `-`, `_` and `.`, and
/// do not start with `.`, so a key never leaves the storage directory.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Durable key-value storage the flow document is written to
pub trait KeyValueStore {
    /// Read the value under `key`; `Ok(None)` when it was never written
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    fn put(&mut self, key: &str, value: &str) -> io::Result<()>;

    /// Remove `key`; removing an absent key succeeds
    fn delete(&mut self, key: &str) -> io::Result<()>;
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a storage directory
    pub fn open(path: &Path) -> io::Result<Self> {
        fs::create_dir_all(path)?;
        Ok(Self {
            root_dir: path.to_path_buf(),
        })
    }

    /// Path of the file backing `key`; `InvalidInput` for keys that could escape the directory
    pub fn key_path(&self, key: &str) -> io::Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key: {key:?}"),
            ));
        }
        Ok(self.root_dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.key_path(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes a sibling temp file and renames it over the old document,
    /// so readers see either the previous or the new contents
    fn put(&mut self, key: &str, value: &str) -> io::Result<()> {
        let path = self.key_path(key)?;
        let temp = NamedTempFile::new_in(&self.root_dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.key_path(key)?) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// In-process storage for headless sessions and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Snapshot of graph and viewport as written to storage
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedFlow {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub viewport: Viewport,
}

impl PersistedFlow {
    /// Capture the store contents, ordered by id so documents are stable
    pub fn from_store(store: &GraphStore, viewport: Viewport) -> Self {
        let mut nodes: Vec<Node> = store.nodes().values().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        let mut edges: Vec<Edge> = store.edges().values().cloned().collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            nodes,
            edges,
            viewport,
        }
    }

    /// Canonical fresh graph: a single start node and no edges
    pub fn initial(start_id: NodeId, start_position: Position, viewport: Viewport) -> Self {
        Self {
            nodes: vec![Node::with_default_label(
                start_id,
                NodeType::Start,
                start_position,
            )],
            edges: Vec::new(),
            viewport,
        }
    }

    /// Serialize to the stored JSON document.
    ///
    /// JSON has no NaN or infinity, so non-finite coordinates are refused
    /// with `NonFiniteCoordinate` instead of being written as `null`.
    pub fn to_json(&self) -> Result<String> {
        self.check_finite()?;
        serde_json::to_string_pretty(&StoredFlow::from(self))
            .map_err(|e| FlowError::corrupt(format!("Failed to serialize flow: {e}")))
    }

    fn check_finite(&self) -> Result<()> {
        if let Some(node) = self.nodes.iter().find(|n| !n.position.is_finite()) {
            return Err(FlowError::NonFiniteCoordinate {
                what: format!("position of node {}", node.id),
            });
        }
        if !self.viewport.is_finite() {
            return Err(FlowError::NonFiniteCoordinate {
                what: "viewport".to_string(),
            });
        }
        Ok(())
    }

    /// Parse a stored JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let stored: StoredFlow = serde_json::from_str(json)
            .map_err(|e| FlowError::corrupt(format!("Failed to parse flow document: {e}")))?;
        Ok(stored.into())
    }
}

// ========== Wire Format ==========

#[derive(Debug, Serialize, Deserialize)]
struct StoredFlow {
    nodes: Vec<StoredNode>,
    edges: Vec<StoredEdge>,
    #[serde(default)]
    viewport: Option<StoredViewport>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredNode {
    id: NodeId,
    #[serde(rename = "type")]
    node_type: NodeType,
    position: Position,
    data: StoredNodeData,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredNodeData {
    label: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEdge {
    id: EdgeId,
    source: NodeId,
    target: NodeId,
}

/// Every field may be missing; each falls back on its own
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredViewport {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    zoom: Option<f64>,
}

impl From<&PersistedFlow> for StoredFlow {
    fn from(flow: &PersistedFlow) -> Self {
        Self {
            nodes: flow
                .nodes
                .iter()
                .map(|n| StoredNode {
                    id: n.id.clone(),
                    node_type: n.node_type,
                    position: n.position,
                    data: StoredNodeData {
                        label: n.label.clone(),
                    },
                })
                .collect(),
            edges: flow
                .edges
                .iter()
                .map(|e| StoredEdge {
                    id: e.id.clone(),
                    source: e.source.clone(),
                    target: e.target.clone(),
                })
                .collect(),
            viewport: Some(StoredViewport {
                x: Some(flow.viewport.x),
                y: Some(flow.viewport.y),
                zoom: Some(flow.viewport.zoom),
            }),
        }
    }
}

impl From<StoredFlow> for PersistedFlow {
    fn from(stored: StoredFlow) -> Self {
        let viewport = stored.viewport.unwrap_or_default();
        let defaults = Viewport::default();

        Self {
            nodes: stored
                .nodes
                .into_iter()
                .map(|n| Node::new(n.id, n.node_type, n.position, n.data.label))
                .collect(),
            edges: stored
                .edges
                .into_iter()
                .map(|e| Edge::new(e.id, e.source, e.target))
                .collect(),
            viewport: Viewport::new(
                viewport.x.unwrap_or(defaults.x),
                viewport.y.unwrap_or(defaults.y),
                viewport.zoom.unwrap_or(defaults.zoom),
            ),
        }
    }
}

// ========== Adapter ==========

/// Saves, restores and resets the flow document under one fixed key
#[derive(Debug, Clone)]
pub struct PersistenceAdapter<S: KeyValueStore> {
    storage: S,
    key: String,
    start_position: Position,
    default_viewport: Viewport,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(storage: S, config: &EditorConfig) -> Self {
        Self {
            storage,
            key: config.storage_key.clone(),
            start_position: config.start_position,
            default_viewport: config.default_viewport,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Write the store contents and viewport as one document
    pub fn save(&mut self, store: &GraphStore, viewport: Viewport) -> Result<()> {
        self.save_flow(&PersistedFlow::from_store(store, viewport))
    }

    pub fn save_flow(&mut self, flow: &PersistedFlow) -> Result<()> {
        let json = flow.to_json()?;
        self.storage
            .put(&self.key, &json)
            .map_err(|e| FlowError::storage(&self.key, e))?;

        info!(
            key = %self.key,
            nodes = flow.nodes.len(),
            edges = flow.edges.len(),
            "flow saved"
        );
        Ok(())
    }

    /// Read the stored document.
    ///
    /// `Ok(None)` when nothing was saved yet; `CorruptState` when the
    /// document cannot be parsed.
    pub fn restore(&self) -> Result<Option<PersistedFlow>> {
        let Some(json) = self
            .storage
            .get(&self.key)
            .map_err(|e| FlowError::storage(&self.key, e))?
        else {
            info!(key = %self.key, "no saved flow");
            return Ok(None);
        };

        let flow = PersistedFlow::from_json(&json).inspect_err(|e| {
            warn!(key = %self.key, error = %e, "stored flow is unreadable");
        })?;

        info!(
            key = %self.key,
            nodes = flow.nodes.len(),
            edges = flow.edges.len(),
            "flow restored"
        );
        Ok(Some(flow))
    }

    /// Delete the stored document and hand back the canonical fresh graph
    pub fn reset(&mut self, start_id: NodeId) -> Result<PersistedFlow> {
        self.storage
            .delete(&self.key)
            .map_err(|e| FlowError::storage(&self.key, e))?;

        info!(key = %self.key, "flow reset");
        Ok(PersistedFlow::initial(
            start_id,
            self.start_position,
            self.default_viewport,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    /// Storage whose every call fails
    struct OfflineStore;

    impl KeyValueStore for OfflineStore {
        fn get(&self, _key: &str) -> io::Result<Option<String>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "offline"))
        }

        fn put(&mut self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "offline"))
        }

        fn delete(&mut self, _key: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "offline"))
        }
    }

    fn sample_store() -> GraphStore {
        let mut store = GraphStore::new();
        let nodes = [
            ("s", NodeType::Start, "Start"),
            ("q", NodeType::Question, "Which plan?"),
            ("a", NodeType::Answer, "answer_ab12"),
        ];
        for (id, node_type, label) in nodes {
            store
                .add_node(Node::new(NodeId::new(id), node_type, Position::new(1.5, -2.0), label))
                .unwrap();
        }
        store
            .add_edge(Edge::new(EdgeId::new("e1"), NodeId::new("s"), NodeId::new("q")))
            .unwrap();
        store
            .add_edge(Edge::new(EdgeId::new("e2"), NodeId::new("q"), NodeId::new("a")))
            .unwrap();
        store
    }

    #[test]
    fn test_save_restore_round_trip() {
        let store = sample_store();
        let viewport = Viewport::new(-40.0, 12.5, 1.25);
        let mut adapter = PersistenceAdapter::new(MemoryStore::new(), &EditorConfig::default());

        adapter.save(&store, viewport).unwrap();
        let restored = adapter.restore().unwrap().unwrap();

        assert_eq!(restored, PersistedFlow::from_store(&store, viewport));
    }

    #[test]
    fn test_non_finite_save_keeps_stored_document() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::new(), &EditorConfig::default());
        let good = sample_store();
        adapter.save(&good, Viewport::default()).unwrap();
        let stored = adapter.storage().get("qa-flow").unwrap();

        let mut bad = good.clone();
        bad.add_node(Node::with_default_label(
            NodeId::new("far"),
            NodeType::Question,
            Position::new(f64::INFINITY, 5.0),
        ))
        .unwrap();
        assert_matches!(
            adapter.save(&bad, Viewport::default()),
            Err(FlowError::NonFiniteCoordinate { what }) if what.contains("far")
        );
        assert_matches!(
            adapter.save(&good, Viewport::new(0.0, 0.0, f64::NAN)),
            Err(FlowError::NonFiniteCoordinate { .. })
        );

        assert_eq!(adapter.storage().get("qa-flow").unwrap(), stored);
        assert_eq!(
            adapter.restore().unwrap().unwrap(),
            PersistedFlow::from_store(&good, Viewport::default())
        );
    }

    #[test]
    fn test_document_shape() {
        let flow = PersistedFlow::from_store(&sample_store(), Viewport::default());
        let value: serde_json::Value = serde_json::from_str(&flow.to_json().unwrap()).unwrap();

        let node = &value["nodes"][0];
        assert_eq!(node["id"], "a");
        assert_eq!(node["type"], "answer");
        assert_eq!(node["position"]["x"], 1.5);
        assert_eq!(node["data"]["label"], "answer_ab12");
        assert_eq!(value["edges"][0]["source"], "s");
        assert_eq!(value["viewport"]["zoom"], 1.0);
    }

    #[test]
    fn test_restore_absent_key() {
        let adapter = PersistenceAdapter::new(MemoryStore::new(), &EditorConfig::default());
        assert_eq!(adapter.restore().unwrap(), None);
    }

    #[test]
    fn test_viewport_defaults() {
        let flow = PersistedFlow::from_json(
            r#"{ "nodes": [], "edges": [], "viewport": { "x": 30 } }"#,
        )
        .unwrap();
        assert_eq!(flow.viewport, Viewport::new(30.0, 0.0, 1.0));

        let flow = PersistedFlow::from_json(r#"{ "nodes": [], "edges": [] }"#).unwrap();
        assert_eq!(flow.viewport, Viewport::default());
    }

    #[test]
    fn test_corrupt_documents() {
        let cases = [
            "{ invalid json }",
            r#"{ "edges": [] }"#,
            r#"{ "nodes": [{ "id": "a", "type": "answer", "position": { "x": 0, "y": 0 } }], "edges": [] }"#,
            r#"{ "nodes": [{ "id": "a", "type": "widget", "position": { "x": 0, "y": 0 }, "data": { "label": "" } }], "edges": [] }"#,
            r#"{ "nodes": [], "edges": [{ "id": "e", "source": "a" }] }"#,
        ];

        for json in cases {
            let mut storage = MemoryStore::new();
            storage.put("qa-flow", json).unwrap();
            let adapter = PersistenceAdapter::new(storage, &EditorConfig::default());

            assert_matches!(adapter.restore(), Err(FlowError::CorruptState { .. }), "{json}");
        }
    }

    #[test]
    fn test_reset_clears_storage() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::new(), &EditorConfig::default());
        adapter.save(&sample_store(), Viewport::default()).unwrap();

        let flow = adapter.reset(NodeId::new("fresh")).unwrap();

        assert_eq!(flow.nodes.len(), 1);
        assert_eq!(flow.nodes[0].node_type, NodeType::Start);
        assert_eq!(flow.nodes[0].position, Position::new(100.0, 10.0));
        assert!(flow.edges.is_empty());
        assert_eq!(flow.viewport, Viewport::default());
        assert_eq!(adapter.restore().unwrap(), None);

        // Resetting twice is fine
        adapter.reset(NodeId::new("again")).unwrap();
    }

    #[test]
    fn test_storage_unavailable() {
        let mut adapter = PersistenceAdapter::new(OfflineStore, &EditorConfig::default());

        assert_matches!(
            adapter.save(&sample_store(), Viewport::default()),
            Err(FlowError::StorageUnavailable { .. })
        );
        assert_matches!(adapter.restore(), Err(FlowError::StorageUnavailable { .. }));
        assert_matches!(
            adapter.reset(NodeId::new("s")),
            Err(FlowError::StorageUnavailable { .. })
        );
    }

    #[test]
    fn test_file_store() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStore::open(&temp_dir.path().join("flows")).unwrap();
        let path = storage.key_path("qa-flow").unwrap();
        let mut adapter = PersistenceAdapter::new(storage, &EditorConfig::default());

        adapter.save(&sample_store(), Viewport::new(5.0, 5.0, 0.5)).unwrap();
        assert!(path.exists());

        let restored = adapter.restore().unwrap().unwrap();
        assert_eq!(restored.nodes.len(), 3);
        assert_eq!(restored.viewport, Viewport::new(5.0, 5.0, 0.5));

        adapter.reset(NodeId::new("s")).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_storage_keys_stay_inside_directory() {
        for key in ["qa-flow", "support_flow.v2", "A1"] {
            assert!(is_valid_key(key), "{key}");
        }
        for key in ["", "../x", "a/b", "a\\b", ".hidden", "..", "flow name"] {
            assert!(!is_valid_key(key), "{key}");
        }

        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStore::open(&temp_dir.path().join("flows")).unwrap();
        assert_eq!(
            storage.key_path("../escape").unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
        assert_eq!(
            storage.put("../escape", "{}").unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
        assert!(!temp_dir.path().join("escape.json").exists());
    }

    #[test]
    fn test_put_replaces_whole_document() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStore::open(temp_dir.path()).unwrap();

        storage.put("qa-flow", "a much longer first document").unwrap();
        storage.put("qa-flow", "short").unwrap();

        assert_eq!(storage.get("qa-flow").unwrap().as_deref(), Some("short"));
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_corrupted_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStore::open(temp_dir.path()).unwrap();
        fs::write(storage.key_path("qa-flow").unwrap(), "{ invalid json }").unwrap();

        let adapter = PersistenceAdapter::new(storage, &EditorConfig::default());
        assert_matches!(adapter.restore(), Err(FlowError::CorruptState { .. }));
    }
}
