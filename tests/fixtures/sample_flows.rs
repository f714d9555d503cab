// Helper functions to build editor sessions and stored documents for tests
#![allow(dead_code)]

use flow_editor::{
    FlowEditor, GestureOutcome, HandleRole, MemoryStore, Node, NodeId, Position, ReleaseTarget,
};

/// Fresh session over in-memory storage, labels reproducible
pub fn fresh_editor() -> FlowEditor<MemoryStore> {
    FlowEditor::new(MemoryStore::new()).with_edit_seed(11)
}

pub fn start_id(editor: &FlowEditor<MemoryStore>) -> NodeId {
    editor.graph().start_node().unwrap().id.clone()
}

/// Drag out of `source` and release on empty canvas at `pointer`
pub fn spawn_from(editor: &mut FlowEditor<MemoryStore>, source: &NodeId, pointer: Position) -> Node {
    assert!(editor.connect_start(source.clone(), HandleRole::Source));
    match editor.connect_end(pointer, ReleaseTarget::Pane).unwrap() {
        GestureOutcome::NodeSpawned { node, .. } => node,
        other => panic!("expected a spawned node, got {other:?}"),
    }
}

/// Start → question → two answers
pub fn create_question_flow() -> (FlowEditor<MemoryStore>, NodeId, NodeId, NodeId, NodeId) {
    let mut editor = fresh_editor();
    let start = start_id(&editor);
    let question = spawn_from(&mut editor, &start, Position::new(175.0, 150.0)).id;
    let yes = spawn_from(&mut editor, &question, Position::new(75.0, 300.0)).id;
    let no = spawn_from(&mut editor, &question, Position::new(325.0, 300.0)).id;
    (editor, start, question, yes, no)
}

/// Document as written by the browser-based editor, viewport partially missing
pub const LEGACY_DOCUMENT: &str = r#"{
  "nodes": [
    { "id": "dndnode_0", "type": "start", "position": { "x": 100, "y": 10 }, "data": { "label": "Start" } },
    { "id": "dndnode_1", "type": "question", "position": { "x": 100, "y": 150 }, "data": { "label": "question node" } }
  ],
  "edges": [
    { "id": "edge_0", "source": "dndnode_0", "target": "dndnode_1" }
  ],
  "viewport": { "x": 25, "zoom": 1.5 }
}"#;

/// Edge pointing at a node the document does not contain
pub const DANGLING_DOCUMENT: &str = r#"{
  "nodes": [
    { "id": "dndnode_0", "type": "start", "position": { "x": 100, "y": 10 }, "data": { "label": "Start" } }
  ],
  "edges": [
    { "id": "edge_0", "source": "dndnode_0", "target": "dndnode_9" }
  ]
}"#;

pub const MALFORMED_DOCUMENT: &str = r#"{ "nodes": [ { "id": "#;
