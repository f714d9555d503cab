use anyhow::{Context, Result};
use flow_editor::{
    EditorConfig, EditorEvent, FileStore, FlowEditor, GestureOutcome, HandleRole, Position,
    ReleaseTarget, ValidationSeverity,
};
use std::path::PathBuf;

/// Replays a short editing session against a flow stored on disk and prints
/// the resulting document.
///
/// Usage: flow_editor [STORAGE_DIR] [CONFIG_JSON]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flow_editor=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let storage_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(".flow"));
    let config = match args.next() {
        Some(path) => EditorConfig::load(&PathBuf::from(path))?,
        None => EditorConfig::default(),
    };

    let storage = FileStore::open(&storage_dir)
        .with_context(|| format!("Failed to open storage directory: {}", storage_dir.display()))?;
    let mut editor = FlowEditor::with_config(storage, config);

    // Pick up where the last session left off, if there was one
    match editor.handle(EditorEvent::Restore) {
        Ok(_) => {}
        Err(e) if e.is_recoverable() => eprintln!("⚠ Keeping fresh graph: {e}"),
        Err(e) => return Err(e.into()),
    }

    let start = editor
        .graph()
        .start_node()
        .map(|n| n.id.clone())
        .context("flow has no start node")?;

    // Start -> question -> answer, each spawned by releasing on empty canvas
    let mut source = start;
    for y in [150.0, 300.0] {
        editor.handle(EditorEvent::ConnectStart {
            node_id: source.clone(),
            role: HandleRole::Source,
        })?;
        let outcome = editor.connect_end(Position::new(250.0, y), ReleaseTarget::Pane)?;
        match outcome {
            GestureOutcome::NodeSpawned { node, edge } => {
                println!("✓ {} -> {} ({})", edge.source, node.id, node.node_type);
                source = node.id;
            }
            other => anyhow::bail!("expected a spawned node, got {other:?}"),
        }
    }

    editor.handle(EditorEvent::Drop {
        payload: "solution".to_string(),
        pointer: Position::new(400.0, 450.0),
    })?;

    editor.handle(EditorEvent::Save)?;
    println!(
        "✓ Saved under '{}' in {}",
        editor.persistence().key(),
        storage_dir.display()
    );

    let result = editor.validate();
    for issue in &result.issues {
        let marker = match issue.severity {
            ValidationSeverity::Error => "❌",
            ValidationSeverity::Warning => "⚠",
            ValidationSeverity::Info => "ℹ",
        };
        println!("{marker} {}", issue.message);
    }

    let document = editor
        .persistence()
        .restore()?
        .context("flow was just saved but could not be read back")?
        .to_json()?;
    println!("{document}");

    Ok(())
}
