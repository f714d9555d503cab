use crate::persistence::is_valid_key;
use crate::{FlowError, Position, Result, Viewport};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Editor settings.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Key the flow document is stored under
    pub storage_key: String,

    /// Rendered node width in canvas units; spawned nodes are shifted left by half of it
    pub node_width: f64,

    /// Where the start node of a fresh graph sits
    pub start_position: Position,

    /// Viewport of a fresh graph
    pub default_viewport: Viewport,

    /// Initial snap-to-grid state of a session
    pub snap_to_grid: bool,

    /// Grid cell size used when snapping
    pub snap_grid: [f64; 2],

    /// Padding the renderer should use when fitting the view
    pub fit_view_padding: f64,

    /// Most graph events kept in memory; older ones are dropped
    pub event_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: "qa-flow".to_string(),
            node_width: 150.0,
            start_position: Position::new(100.0, 10.0),
            default_viewport: Viewport::default(),
            snap_to_grid: false,
            snap_grid: [15.0, 15.0],
            fit_view_padding: 3.0,
            event_capacity: crate::store::DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl EditorConfig {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| FlowError::Config {
            reason: format!("Failed to open {}: {}", path.display(), e),
        })?;
        let config: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| FlowError::Config {
                reason: format!("Failed to parse {}: {}", path.display(), e),
            })?;

        if !is_valid_key(&config.storage_key) {
            return Err(FlowError::Config {
                reason: format!("Invalid storage_key {:?} in {}", config.storage_key, path.display()),
            });
        }
        Ok(config)
    }

    /// Load settings if the file exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Horizontal shift that centers a spawned node under the pointer
    pub fn spawn_offset(&self) -> f64 {
        self.node_width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.storage_key, "qa-flow");
        assert_eq!(config.spawn_offset(), 75.0);
        assert_eq!(config.start_position, Position::new(100.0, 10.0));
        assert_eq!(config.default_viewport, Viewport::new(0.0, 0.0, 1.0));
        assert!(!config.snap_to_grid);
        assert_eq!(config.event_capacity, 1024);
    }

    #[test]
    fn test_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("editor.json");
        fs::write(&path, r#"{ "storage_key": "other", "node_width": 200 }"#).unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.storage_key, "other");
        assert_eq!(config.spawn_offset(), 100.0);
        assert_eq!(config.snap_grid, [15.0, 15.0]);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let config = EditorConfig::load_or_default(&temp_dir.path().join("nope.json")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_corrupted_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("editor.json");
        fs::write(&path, "{ invalid json }").unwrap();

        assert_matches!(EditorConfig::load(&path), Err(FlowError::Config { .. }));
    }

    #[test]
    fn test_storage_key_cannot_escape() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("editor.json");
        fs::write(&path, r#"{ "storage_key": "../outside" }"#).unwrap();

        assert_matches!(
            EditorConfig::load(&path),
            Err(FlowError::Config { reason }) if reason.contains("storage_key")
        );
    }
}
