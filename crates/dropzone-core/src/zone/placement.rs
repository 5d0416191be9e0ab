//! Default placement for widgets added without an explicit position.

use crate::config::PlacementConfig;
use crate::widget::{Position, Rect, Size, WidgetRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placement policy for newly added widgets.
///
/// Changing the mode never moves existing widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Cascade each new widget diagonally from the previous one.
    #[default]
    Free,
    /// First free cell of a fixed-size grid.
    Grid,
    /// Left-to-right rows after the last widget, wrapping at the surface width.
    Flow,
}

impl LayoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Grid => "grid",
            Self::Flow => "flow",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "grid" => Ok(Self::Grid),
            "flow" => Ok(Self::Flow),
            other => Err(format!("unknown layout mode \"{}\"", other)),
        }
    }
}

/// Where a widget of `size` goes when added to `existing` under `mode`.
pub fn default_position(
    mode: LayoutMode,
    existing: &[WidgetRecord],
    size: Size,
    config: &PlacementConfig,
    bounds: Option<Size>,
) -> Position {
    match mode {
        LayoutMode::Free => cascade_position(existing.len(), config),
        LayoutMode::Grid => first_free_cell(existing, config, bounds),
        LayoutMode::Flow => next_flow_position(existing, size, config, bounds),
    }
}

fn cascade_position(count: usize, config: &PlacementConfig) -> Position {
    let step = (count + 1) as i32;
    Position::new(step.saturating_mul(config.cascade.0), step.saturating_mul(config.cascade.1))
}

fn grid_columns(config: &PlacementConfig, bounds: Option<Size>) -> u32 {
    match bounds {
        Some(b) => (b.width.saturating_sub(config.margin) / config.cell.width.max(1)).max(1),
        None => config.columns.max(1),
    }
}

fn first_free_cell(
    existing: &[WidgetRecord],
    config: &PlacementConfig,
    bounds: Option<Size>,
) -> Position {
    let columns = grid_columns(config, bounds) as usize;
    let margin = config.margin as i32;
    let (cw, ch) = (config.cell.width as i32, config.cell.height as i32);

    // Every record blocks at most finitely many cells, so this terminates.
    let mut index = 0usize;
    loop {
        let (row, col) = ((index / columns) as i32, (index % columns) as i32);
        let origin = Position::new(margin + col * cw, margin + row * ch);
        let cell = Rect::new(origin, config.cell);
        if !existing.iter().any(|r| r.rect().intersects(&cell)) {
            return origin;
        }
        index += 1;
    }
}

fn next_flow_position(
    existing: &[WidgetRecord],
    size: Size,
    config: &PlacementConfig,
    bounds: Option<Size>,
) -> Position {
    let margin = config.margin as i64;
    let spacing = config.flow_spacing as i64;
    let Some(last) = existing.last() else {
        return Position::new(margin as i32, margin as i32);
    };

    let width = bounds.map_or(config.flow_width, |b| b.width) as i64;
    let x = last.right() + spacing;
    if x + size.width as i64 <= width - margin {
        return Position::new(x as i32, last.position.y);
    }

    // Wrap below the tallest widget of the last row.
    let row_bottom = existing
        .iter()
        .filter(|r| r.position.y == last.position.y)
        .map(WidgetRecord::bottom)
        .max()
        .unwrap_or_else(|| last.bottom());
    Position::new(margin as i32, (row_bottom + spacing) as i32)
}
