//! Resize handles and the geometry of a resize gesture.

use super::record::{Position, Size, WidgetRecord};
use kurbo::Point;

/// The kind of handle - determines which edges a resize moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    // Corner handles
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    // Edge handles (single axis)
    Top,
    Bottom,
    Left,
    Right,
}

impl HandleKind {
    pub const ALL: [HandleKind; 8] = [
        HandleKind::TopLeft,
        HandleKind::TopRight,
        HandleKind::BottomLeft,
        HandleKind::BottomRight,
        HandleKind::Top,
        HandleKind::Bottom,
        HandleKind::Left,
        HandleKind::Right,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "top_left",
            Self::TopRight => "top_right",
            Self::BottomLeft => "bottom_left",
            Self::BottomRight => "bottom_right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft | Self::Left)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight | Self::Right)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight | Self::Top)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight | Self::Bottom)
    }

    /// Edge handles constrain the resize to one axis.
    pub fn is_edge(self) -> bool {
        matches!(self, Self::Top | Self::Bottom | Self::Left | Self::Right)
    }
}

/// A manipulation handle on a widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    /// Position in surface coordinates.
    pub position: Point,
}

impl Handle {
    pub fn new(kind: HandleKind, position: Point) -> Self {
        Self { kind, position }
    }
}

/// Handles for a record's bounding box, corners first.
pub fn handles_for(record: &WidgetRecord) -> Vec<Handle> {
    let x0 = record.position.x as f64;
    let y0 = record.position.y as f64;
    let x1 = x0 + record.size.width as f64;
    let y1 = y0 + record.size.height as f64;
    let cx = (x0 + x1) / 2.0;
    let cy = (y0 + y1) / 2.0;
    vec![
        Handle::new(HandleKind::TopLeft, Point::new(x0, y0)),
        Handle::new(HandleKind::TopRight, Point::new(x1, y0)),
        Handle::new(HandleKind::BottomLeft, Point::new(x0, y1)),
        Handle::new(HandleKind::BottomRight, Point::new(x1, y1)),
        Handle::new(HandleKind::Top, Point::new(cx, y0)),
        Handle::new(HandleKind::Bottom, Point::new(cx, y1)),
        Handle::new(HandleKind::Left, Point::new(x0, cy)),
        Handle::new(HandleKind::Right, Point::new(x1, cy)),
    ]
}

/// Hit test the handles of a record.
pub fn hit_test_handle(record: &WidgetRecord, point: Point, tolerance: f64) -> Option<HandleKind> {
    handles_for(record)
        .into_iter()
        .find(|h| (h.position - point).hypot2() <= tolerance * tolerance)
        .map(|h| h.kind)
}

/// Compute the geometry after dragging `handle` by `(dx, dy)`.
///
/// The edges opposite the handle stay fixed; sizes never drop below `min_size`.
pub fn apply_resize(
    position: Position,
    size: Size,
    handle: HandleKind,
    dx: i32,
    dy: i32,
    min_size: Size,
) -> (Position, Size) {
    let mut left = position.x as i64;
    let mut top = position.y as i64;
    let mut right = left + size.width as i64;
    let mut bottom = top + size.height as i64;
    let min_w = min_size.width as i64;
    let min_h = min_size.height as i64;

    if handle.moves_left() {
        left = (left + dx as i64).min(right - min_w);
    }
    if handle.moves_right() {
        right = (right + dx as i64).max(left + min_w);
    }
    if handle.moves_top() {
        top = (top + dy as i64).min(bottom - min_h);
    }
    if handle.moves_bottom() {
        bottom = (bottom + dy as i64).max(top + min_h);
    }

    (
        Position::new(left as i32, top as i32),
        Size::new((right - left) as u32, (bottom - top) as u32),
    )
}

/// Snap the edges a handle moves to the grid, keeping the opposite edges.
pub fn snap_resize(
    position: Position,
    size: Size,
    handle: HandleKind,
    grid_size: u32,
    min_size: Size,
) -> (Position, Size) {
    let snap = |v: i64| crate::snap::snap_value(v as i32, grid_size) as i64;
    let mut left = position.x as i64;
    let mut top = position.y as i64;
    let mut right = left + size.width as i64;
    let mut bottom = top + size.height as i64;

    if handle.moves_left() {
        left = snap(left).min(right - min_size.width as i64);
    }
    if handle.moves_right() {
        right = snap(right).max(left + min_size.width as i64);
    }
    if handle.moves_top() {
        top = snap(top).min(bottom - min_size.height as i64);
    }
    if handle.moves_bottom() {
        bottom = snap(bottom).max(top + min_size.height as i64);
    }

    (
        Position::new(left as i32, top as i32),
        Size::new((right - left) as u32, (bottom - top) as u32),
    )
}
