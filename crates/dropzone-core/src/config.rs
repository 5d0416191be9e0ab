//! Tunable parameters for a drop zone and its collaborators.
//!
//! Every field has a default, so a partial JSON or YAML file only needs to
//! name the values it changes:
//!
//! ```yaml
//! grid_size: 25
//! layout_mode: grid
//! drag:
//!   threshold: 8
//!   settle_duration_ms: 300
//! ```

use crate::error::{LayoutError, LayoutResult};
use crate::snap::DEFAULT_GRID_SIZE;
use crate::widget::Size;
use crate::zone::LayoutMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for a [`crate::zone::DropZone`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropZoneConfig {
    /// Grid cell size in pixels.
    pub grid_size: u32,
    pub grid_visible: bool,
    pub layout_mode: LayoutMode,
    /// Surface size. `None` leaves the zone unbounded.
    pub bounds: Option<Size>,
    pub placement: PlacementConfig,
    pub drag: DragConfig,
    pub events: EventBusConfig,
}

impl Default for DropZoneConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            grid_visible: true,
            layout_mode: LayoutMode::Free,
            bounds: None,
            placement: PlacementConfig::default(),
            drag: DragConfig::default(),
            events: EventBusConfig::default(),
        }
    }
}

impl DropZoneConfig {
    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> LayoutResult<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a YAML string.
    pub fn from_yaml_str(s: &str) -> LayoutResult<Self> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, YAML for `.yaml`/`.yml` and JSON otherwise.
    pub fn load(path: impl AsRef<Path>) -> LayoutResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LayoutError::Io(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> LayoutResult<()> {
        if self.grid_size == 0 {
            return Err(LayoutError::invalid("grid_size must be positive"));
        }
        if self.placement.columns == 0 {
            return Err(LayoutError::invalid("placement.columns must be positive"));
        }
        if self.placement.cell.width == 0 || self.placement.cell.height == 0 {
            return Err(LayoutError::invalid("placement.cell must have a positive size"));
        }
        Ok(())
    }
}

/// Default placement of widgets added without an explicit position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Distance from the surface edge to the first grid cell or flow item.
    pub margin: u32,
    /// Grid-mode cell size.
    pub cell: Size,
    /// Grid-mode column count when the zone is unbounded.
    pub columns: u32,
    /// Free-mode offset applied per existing widget.
    pub cascade: (i32, i32),
    /// Gap between consecutive flow-mode widgets.
    pub flow_spacing: u32,
    /// Flow-mode wrap width when the zone is unbounded.
    pub flow_width: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            margin: 20,
            cell: Size::new(150, 100),
            columns: 4,
            cascade: (50, 30),
            flow_spacing: 10,
            flow_width: 800,
        }
    }
}

/// Drag and resize gesture parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Manhattan pointer distance that must be exceeded before a drag starts.
    pub threshold: u32,
    /// Length of the settle animation. Zero settles instantly.
    pub settle_duration_ms: u64,
    /// Smallest size a resize may produce.
    pub min_size: Size,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            threshold: 5,
            settle_duration_ms: 0,
            min_size: Size::new(50, 30),
        }
    }
}

impl DragConfig {
    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_duration_ms)
    }
}

/// What a cancelled event means for the handlers after the cancelling one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    /// Cancellation only sets a flag; every handler still runs.
    #[default]
    Advisory,
    /// The bus stops dispatching once a handler cancels.
    StopPropagation,
}

/// Event bus parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Maximum number of events kept in history. Zero disables history.
    pub history_capacity: usize,
    pub cancel_policy: CancelPolicy,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            history_capacity: 1000,
            cancel_policy: CancelPolicy::Advisory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DropZoneConfig::default();
        assert_eq!(config.grid_size, 20);
        assert!(config.grid_visible);
        assert_eq!(config.layout_mode, LayoutMode::Free);
        assert_eq!(config.drag.threshold, 5);
        assert_eq!(config.events.history_capacity, 1000);
        assert_eq!(config.events.cancel_policy, CancelPolicy::Advisory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "grid_size: 25\nlayout_mode: grid\ndrag:\n  threshold: 8\n";
        let config = DropZoneConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.grid_size, 25);
        assert_eq!(config.layout_mode, LayoutMode::Grid);
        assert_eq!(config.drag.threshold, 8);
        // Untouched sections keep their defaults.
        assert_eq!(config.drag.min_size, Size::new(50, 30));
        assert_eq!(config.placement, PlacementConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{"events": {"cancel_policy": "stop_propagation"},
            "bounds": {"width": 800, "height": 600}}"#;
        let config = DropZoneConfig::from_json_str(json).unwrap();
        assert_eq!(config.events.cancel_policy, CancelPolicy::StopPropagation);
        assert_eq!(config.bounds, Some(Size::new(800, 600)));
    }

    #[test]
    fn test_rejects_zero_grid() {
        let err = DropZoneConfig::from_json_str(r#"{"grid_size": 0}"#).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidArgument(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zone.yml");
        std::fs::write(&path, "grid_visible: false\n").unwrap();
        let config = DropZoneConfig::load(&path).unwrap();
        assert!(!config.grid_visible);

        let missing = DropZoneConfig::load(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(LayoutError::Io(_))));
    }
}
