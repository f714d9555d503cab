/// Example: Building a small question/answer flow
///
/// This example demonstrates:
/// - Starting from the fresh single-start graph
/// - Spawning nodes by dragging out of a connector onto empty canvas
/// - Dropping a palette item onto the canvas
/// - Connecting two existing nodes
/// - Editing a label and deleting a node
/// - Saving, resetting and restoring the flow

use anyhow::Result;
use flow_editor::*;
use std::path::PathBuf;

fn spawn_from(editor: &mut FlowEditor<FileStore>, source: &NodeId, pointer: Position) -> Result<Node> {
    editor.connect_start(source.clone(), HandleRole::Source);
    match editor.connect_end(pointer, ReleaseTarget::Pane)? {
        GestureOutcome::NodeSpawned { node, .. } => Ok(node),
        other => Err(anyhow::anyhow!("gesture did not spawn a node: {other:?}")),
    }
}

fn main() -> Result<()> {
    println!("=== Flow Editor: Simple Flow Example ===\n");

    // Step 1: Open storage and start a session
    println!("Step 1: Opening editor...");
    let storage_path = PathBuf::from("/tmp/simple_flow");
    let storage = FileStore::open(&storage_path)?;
    let mut editor = FlowEditor::new(storage).with_edit_seed(42);
    editor.reset()?;

    let start = editor
        .graph()
        .start_node()
        .map(|n| n.id.clone())
        .ok_or_else(|| anyhow::anyhow!("fresh flow has no start node"))?;
    println!("  ✓ Fresh flow with start node {start}");

    // Step 2: Drag out of the start node onto empty canvas
    println!("\nStep 2: Spawning connected nodes...");
    let question = spawn_from(&mut editor, &start, Position::new(175.0, 150.0))?;
    println!("  ✓ {} '{}'", question.node_type, question.label);

    let yes = spawn_from(&mut editor, &question.id, Position::new(75.0, 300.0))?;
    let no = spawn_from(&mut editor, &question.id, Position::new(325.0, 300.0))?;
    println!("  ✓ {} '{}' and {} '{}'", yes.node_type, yes.label, no.node_type, no.label);

    // Step 3: Drop a solution from the palette and wire it up
    println!("\nStep 3: Dropping a solution...");
    let solution = editor
        .drop_node("solution", Position::new(150.0, 450.0))?
        .ok_or_else(|| anyhow::anyhow!("palette rejected the payload"))?;
    editor.connect_start(yes.id.clone(), HandleRole::Source);
    let outcome = editor.connect_end(Position::new(150.0, 450.0), ReleaseTarget::incoming(solution.id.clone()))?;
    println!("  ✓ Connected: {}", !outcome.is_abandoned());

    // Step 4: Edit and delete
    println!("\nStep 4: Editing...");
    if let Some(label) = editor.save_edit(&yes.id, "Yes, it is plugged in") {
        println!("  ✓ Relabelled answer to '{label}'");
    }
    let (removed, edges) = editor.delete_node(&no.id)?;
    println!("  ✓ Deleted '{}' and {} edge(s)", removed.label, edges.len());

    // Step 5: Validate
    println!("\nStep 5: Validating flow...");
    let result = editor.validate();
    if result.has_errors() {
        for error in result.errors() {
            println!("  ❌ {}", error.message);
        }
        return Err(anyhow::anyhow!("Validation failed"));
    }
    for warning in result.warnings() {
        println!("  ⚠ {}", warning.message);
    }
    println!("  ✓ Validation passed ({} info items)", result.info().len());

    // Step 6: Save, reset, restore
    println!("\nStep 6: Saving and restoring...");
    editor.save()?;
    let saved_nodes = editor.graph().node_count();
    println!("  ✓ Saved {} nodes to {}", saved_nodes, storage_path.display());

    editor.handle(EditorEvent::ToggleSnapGrid)?;
    editor.drop_node("link", Position::new(0.0, 0.0))?;
    editor.restore()?;
    println!("  ✓ Restored {} nodes, {} edges", editor.graph().node_count(), editor.graph().edge_count());

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
