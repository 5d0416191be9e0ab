//! The passive per-widget data record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Opaque metadata owned by the widget's kind (text, colors, image paths...).
pub type Metadata = serde_json::Map<String, Value>;

/// Unique identifier for widget records.
///
/// Generated ids are UUIDv4 strings, but any string read back from a layout
/// document is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WidgetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Surface-relative integer coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this position by a delta.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Round a floating point location to the nearest pixel.
    pub fn from_point(point: kurbo::Point) -> Self {
        Self::new(point.x.round() as i32, point.y.round() as i32)
    }

    pub fn to_point(self) -> kurbo::Point {
        kurbo::Point::new(self.x as f64, self.y as f64)
    }
}

/// Widget size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned integer rectangle, used for overlap and bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(position: Position, size: Size) -> Self {
        Self {
            x: position.x as i64,
            y: position.y as i64,
            width: size.width as i64,
            height: size.height as i64,
        }
    }

    pub fn right(&self) -> i64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height
    }

    /// Check whether `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Check whether the two rectangles share any area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest rectangle enclosing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Independent capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetFlags {
    #[serde(default = "default_true")]
    pub draggable: bool,
    #[serde(default = "default_true")]
    pub resizable: bool,
    #[serde(default = "default_true")]
    pub deletable: bool,
}

fn default_true() -> bool {
    true
}

impl Default for WidgetFlags {
    fn default() -> Self {
        Self {
            draggable: true,
            resizable: true,
            deletable: true,
        }
    }
}

/// Per-record grid snapping applied when a drag settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapSettings {
    pub enabled: bool,
    pub grid_size: u32,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            grid_size: crate::snap::DEFAULT_GRID_SIZE,
        }
    }
}

impl SnapSettings {
    /// Snapping enabled with the given grid size.
    pub fn grid(grid_size: u32) -> Self {
        Self {
            enabled: true,
            grid_size,
        }
    }

    /// Whether this record actually snaps (enabled with a usable grid).
    pub fn is_active(&self) -> bool {
        self.enabled && self.grid_size > 0
    }
}

/// One placed widget instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetRecord {
    id: WidgetId,
    /// Kind discriminator, resolved by a [`crate::widget::WidgetRegistry`].
    pub kind: String,
    /// Top-left corner, surface-relative.
    pub position: Position,
    pub size: Size,
    z_index: usize,
    pub flags: WidgetFlags,
    pub snap: SnapSettings,
    selected: bool,
    pub metadata: Metadata,
}

impl WidgetRecord {
    /// Create a record with a freshly generated id.
    pub fn new(kind: impl Into<String>, size: Size) -> Self {
        Self::with_id(WidgetId::generate(), kind, size)
    }

    /// Create a record with a specific id (documents, tests).
    pub fn with_id(id: WidgetId, kind: impl Into<String>, size: Size) -> Self {
        Self {
            id,
            kind: kind.into(),
            position: Position::ORIGIN,
            size,
            z_index: 0,
            flags: WidgetFlags::default(),
            snap: SnapSettings::default(),
            selected: false,
            metadata: Metadata::new(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_flags(mut self, flags: WidgetFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_snap(mut self, snap: SnapSettings) -> Self {
        self.snap = snap;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set a single metadata value.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    /// Paint order within the owning zone (0 = bottom).
    pub fn z_index(&self) -> usize {
        self.z_index
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_z_index(&mut self, z_index: usize) {
        self.z_index = z_index;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn right(&self) -> i64 {
        self.rect().right()
    }

    pub fn bottom(&self) -> i64 {
        self.rect().bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = WidgetRecord::new("button", Size::new(100, 35));
        let b = WidgetRecord::new("button", Size::new(100, 35));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_record_defaults() {
        let record = WidgetRecord::new("label", Size::new(80, 30));
        assert_eq!(record.position, Position::ORIGIN);
        assert!(record.flags.draggable);
        assert!(record.flags.resizable);
        assert!(record.flags.deletable);
        assert!(!record.is_selected());
        assert!(!record.snap.is_active());
        assert!(record.metadata.is_empty());
    }

    #[test]
    fn test_rect_edges() {
        let record = WidgetRecord::new("label", Size::new(80, 30)).at(Position::new(10, -5));
        let rect = record.rect();
        assert_eq!(rect.right(), 90);
        assert_eq!(rect.bottom(), 25);
    }

    #[test]
    fn test_rect_intersection_and_containment() {
        let outer = Rect::new(Position::ORIGIN, Size::new(100, 100));
        let inner = Rect::new(Position::new(10, 10), Size::new(20, 20));
        let edge = Rect::new(Position::new(100, 0), Size::new(10, 10));
        assert!(outer.contains_rect(&inner));
        assert!(outer.intersects(&inner));
        // Touching edges do not overlap.
        assert!(!outer.intersects(&edge));
        assert!(!outer.contains_rect(&edge));
        assert_eq!(outer.union(&edge).right(), 110);
    }

    #[test]
    fn test_position_from_point_rounds() {
        let pos = Position::from_point(kurbo::Point::new(10.4, -2.6));
        assert_eq!(pos, Position::new(10, -3));
    }

    #[test]
    fn test_widget_id_serializes_as_string() {
        let id = WidgetId::new("w1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"w1\"");
    }
}
