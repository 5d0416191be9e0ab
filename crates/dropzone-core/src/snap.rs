//! Snap functionality for aligning widgets to the grid and to each other.

use crate::widget::{Position, WidgetId, WidgetRecord};

/// Default grid size for snapping (matches the visual grid).
pub const DEFAULT_GRID_SIZE: u32 = 20;

/// Default distance within which alignment suggestions are offered.
pub const ALIGNMENT_THRESHOLD: i32 = 10;

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapResult {
    /// The snapped position.
    pub position: Position,
    /// Whether the X coordinate changed.
    pub snapped_x: bool,
    /// Whether the Y coordinate changed.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(position: Position) -> Self {
        Self {
            position,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Quantize a single coordinate to the nearest multiple of `grid_size`.
///
/// Halfway values round away from zero. A zero grid leaves the value alone.
pub fn snap_value(value: i32, grid_size: u32) -> i32 {
    if grid_size == 0 {
        return value;
    }
    let grid = grid_size as f64;
    ((value as f64 / grid).round() * grid) as i32
}

/// Snap a position to the nearest grid intersection, each axis independently.
pub fn snap_to_grid(position: Position, grid_size: u32) -> SnapResult {
    let snapped = Position::new(
        snap_value(position.x, grid_size),
        snap_value(position.y, grid_size),
    );
    SnapResult {
        position: snapped,
        snapped_x: snapped.x != position.x,
        snapped_y: snapped.y != position.y,
    }
}

/// Which edge or center an alignment suggestion lines up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignmentGuide {
    Left,
    Right,
    Top,
    Bottom,
    CenterHorizontal,
    CenterVertical,
}

/// A proposed position that lines `target` up with another widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentSuggestion {
    pub guide: AlignmentGuide,
    /// The widget whose edge would be matched.
    pub reference: WidgetId,
    /// Where `target` would move to.
    pub position: Position,
}

/// Suggest positions that align `target` with nearby edges of `others`.
///
/// Only edges within `threshold` pixels produce a suggestion; the closest
/// reference wins for each guide.
pub fn alignment_suggestions(
    target: &WidgetRecord,
    others: &[WidgetRecord],
    threshold: i32,
) -> Vec<AlignmentSuggestion> {
    let t = target.rect();
    let mut best: Vec<(AlignmentSuggestion, i64)> = Vec::new();
    let mut offer = |guide: AlignmentGuide, distance: i64, reference: &WidgetId, at: Position| {
        if distance > threshold as i64 {
            return;
        }
        let suggestion = AlignmentSuggestion { guide, reference: reference.clone(), position: at };
        match best.iter_mut().find(|(s, _)| s.guide == guide) {
            Some((existing, d)) if distance < *d => {
                *existing = suggestion;
                *d = distance;
            }
            Some(_) => {}
            None => best.push((suggestion, distance)),
        }
    };

    for other in others.iter().filter(|o| o.id() != target.id()) {
        let o = other.rect();
        let id = other.id();
        let (x, y) = (target.position.x, target.position.y);
        let (w, h) = (t.width, t.height);

        let (tcx, ocx) = (t.x + w / 2, o.x + o.width / 2);
        let (tcy, ocy) = (t.y + h / 2, o.y + o.height / 2);

        let left = Position::new(o.x as i32, y);
        let right = Position::new((o.right() - w) as i32, y);
        let top = Position::new(x, o.y as i32);
        let bottom = Position::new(x, (o.bottom() - h) as i32);
        let center_h = Position::new((ocx - w / 2) as i32, y);
        let center_v = Position::new(x, (ocy - h / 2) as i32);

        offer(AlignmentGuide::Left, (t.x - o.x).abs(), id, left);
        offer(AlignmentGuide::Right, (t.right() - o.right()).abs(), id, right);
        offer(AlignmentGuide::Top, (t.y - o.y).abs(), id, top);
        offer(AlignmentGuide::Bottom, (t.bottom() - o.bottom()).abs(), id, bottom);
        offer(AlignmentGuide::CenterHorizontal, (tcx - ocx).abs(), id, center_h);
        offer(AlignmentGuide::CenterVertical, (tcy - ocy).abs(), id, center_v);
    }

    best.into_iter()
        .map(|(s, _)| s)
        .filter(|s| s.position != target.position)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Size;

    #[test]
    fn test_snap_to_grid() {
        let result = snap_to_grid(Position::new(23, 47), 20);
        assert_eq!(result.position, Position::new(20, 40));
        assert!(result.snapped_x);
        assert!(result.snapped_y);
    }

    #[test]
    fn test_snap_to_grid_exact() {
        let result = snap_to_grid(Position::new(40, 60), 20);
        assert_eq!(result.position, Position::new(40, 60));
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_snap_to_grid_round_up() {
        let result = snap_to_grid(Position::new(31, 51), 20);
        assert_eq!(result.position, Position::new(40, 60));
    }

    #[test]
    fn test_snap_to_nearest_multiple_of_25() {
        // 112 / 25 = 4.48 -> 100; 237 / 25 = 9.48 -> 225; 238 / 25 = 9.52 -> 250
        assert_eq!(snap_to_grid(Position::new(112, 237), 25).position, Position::new(100, 225));
        assert_eq!(snap_to_grid(Position::new(112, 238), 25).position, Position::new(100, 250));
    }

    #[test]
    fn test_snap_negative_coordinates() {
        assert_eq!(snap_value(-31, 20), -40);
        assert_eq!(snap_value(-29, 20), -20);
        assert_eq!(snap_value(-10, 20), -20);
    }

    #[test]
    fn test_zero_grid_is_noop() {
        assert_eq!(snap_value(17, 0), 17);
    }

    #[test]
    fn test_alignment_suggestions_left_edge() {
        let anchor = WidgetRecord::new("label", Size::new(80, 30)).at(Position::new(100, 0));
        let target = WidgetRecord::new("label", Size::new(60, 30)).at(Position::new(106, 200));
        let suggestions = alignment_suggestions(&target, &[anchor.clone()], ALIGNMENT_THRESHOLD);

        let left = suggestions.iter().find(|s| s.guide == AlignmentGuide::Left).unwrap();
        assert_eq!(left.position, Position::new(100, 200));
        assert_eq!(&left.reference, anchor.id());
        // Far vertical edges produce nothing.
        assert!(!suggestions.iter().any(|s| s.guide == AlignmentGuide::Top));
    }

    #[test]
    fn test_alignment_suggestions_prefers_closest() {
        let near = WidgetRecord::new("label", Size::new(50, 50)).at(Position::new(0, 103));
        let far = WidgetRecord::new("label", Size::new(50, 50)).at(Position::new(300, 92));
        let target = WidgetRecord::new("label", Size::new(50, 50)).at(Position::new(600, 100));
        let suggestions = alignment_suggestions(&target, &[far, near.clone()], ALIGNMENT_THRESHOLD);
        let top = suggestions.iter().find(|s| s.guide == AlignmentGuide::Top).unwrap();
        assert_eq!(&top.reference, near.id());
        assert_eq!(top.position, Position::new(600, 103));
    }

    #[test]
    fn test_alignment_suggestions_skip_self() {
        let target = WidgetRecord::new("label", Size::new(50, 50)).at(Position::new(10, 10));
        assert!(alignment_suggestions(&target, &[target.clone()], ALIGNMENT_THRESHOLD).is_empty());
    }
}
