//! Stateless bulk arrangement algorithms.
//!
//! Every function takes the records to work on explicitly, validates its
//! arguments, and only then mutates positions or sizes. Nothing outside the
//! supplied slice is read or written; the slice order is never changed.

use crate::error::{LayoutError, LayoutResult};
use crate::widget::{Position, Rect, WidgetRecord};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Edge or center line for [`align_widgets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
    /// Align horizontal centers (moves along x).
    CenterHorizontal,
    /// Align vertical centers (moves along y).
    CenterVertical,
}

/// Axis for [`distribute_widgets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Dimension for [`resize_uniform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Width,
    Height,
    Both,
}

/// Smallest rectangle enclosing every record, `None` for an empty slice.
pub fn bounding_rect(records: &[WidgetRecord]) -> Option<Rect> {
    records
        .iter()
        .map(WidgetRecord::rect)
        .reduce(|acc, r| acc.union(&r))
}

fn require_records(records: &[WidgetRecord], op: &str) -> LayoutResult<Rect> {
    bounding_rect(records)
        .ok_or_else(|| LayoutError::invalid(format!("{} needs at least one widget", op)))
}

/// Align every record to the extreme edge (or the bounding-box center) of the group.
///
/// Only the coordinate on the alignment axis changes.
pub fn align_widgets(records: &mut [WidgetRecord], edge: Edge) -> LayoutResult<()> {
    let bounds = require_records(records, "align")?;
    log::debug!("Aligning {} widget(s) to {:?}", records.len(), edge);

    for record in records.iter_mut() {
        let w = record.size.width as i64;
        let h = record.size.height as i64;
        match edge {
            Edge::Left => record.position.x = bounds.x as i32,
            Edge::Right => record.position.x = (bounds.right() - w) as i32,
            Edge::Top => record.position.y = bounds.y as i32,
            Edge::Bottom => record.position.y = (bounds.bottom() - h) as i32,
            Edge::CenterHorizontal => {
                let mid = (bounds.x + bounds.right()).div_euclid(2);
                record.position.x = (mid - w / 2) as i32;
            }
            Edge::CenterVertical => {
                let mid = (bounds.y + bounds.bottom()).div_euclid(2);
                record.position.y = (mid - h / 2) as i32;
            }
        }
    }
    Ok(())
}

/// Space records evenly along an axis.
///
/// Records are ordered by their current position on the axis. The first and
/// last keep their place; the rest are moved so every gap between consecutive
/// edges is equal. Fewer than three records is a no-op.
pub fn distribute_widgets(records: &mut [WidgetRecord], axis: Axis) -> LayoutResult<()> {
    require_records(records, "distribute")?;
    if records.len() < 3 {
        return Ok(());
    }

    let start = |r: &WidgetRecord| match axis {
        Axis::Horizontal => r.position.x as i64,
        Axis::Vertical => r.position.y as i64,
    };
    let extent = |r: &WidgetRecord| match axis {
        Axis::Horizontal => r.size.width as i64,
        Axis::Vertical => r.size.height as i64,
    };

    // Stable, so records sharing a coordinate keep their input order.
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by_key(|&i| start(&records[i]));

    let first = &records[order[0]];
    let last = &records[order[order.len() - 1]];
    let span = start(last) + extent(last) - start(first);
    let occupied: i64 = order.iter().map(|&i| extent(&records[i])).sum();
    let gap = (span - occupied) as f64 / (order.len() - 1) as f64;
    log::debug!("Distributing {} widget(s) {:?}, gap {:.1}", records.len(), axis, gap);

    let mut cursor = start(first) as f64;
    let mut targets = Vec::with_capacity(order.len());
    for (n, &i) in order.iter().enumerate() {
        if n > 0 {
            cursor += extent(&records[order[n - 1]]) as f64 + gap;
        }
        targets.push((i, cursor.round() as i64));
    }

    for &(i, value) in &targets[1..targets.len() - 1] {
        match axis {
            Axis::Horizontal => records[i].position.x = value as i32,
            Axis::Vertical => records[i].position.y = value as i32,
        }
    }
    Ok(())
}

/// Grow every resizable record to the largest width and/or height in the group.
///
/// The maximum is taken over all records; fixed-size records keep their size.
/// Top-left corners do not move.
pub fn resize_uniform(records: &mut [WidgetRecord], dimension: Dimension) -> LayoutResult<()> {
    require_records(records, "resize")?;
    let max_width = records.iter().map(|r| r.size.width).max().unwrap_or(0);
    let max_height = records.iter().map(|r| r.size.height).max().unwrap_or(0);

    for record in records.iter_mut().filter(|r| r.flags.resizable) {
        if matches!(dimension, Dimension::Width | Dimension::Both) {
            record.size.width = max_width;
        }
        if matches!(dimension, Dimension::Height | Dimension::Both) {
            record.size.height = max_height;
        }
    }
    Ok(())
}

/// Arrange records row-major into `columns` columns, anchored at the group's
/// current top-left corner.
pub fn arrange_grid(
    records: &mut [WidgetRecord],
    columns: usize,
    spacing: u32,
) -> LayoutResult<()> {
    let bounds = require_records(records, "grid arrangement")?;
    arrange_grid_at(records, columns, spacing, Position::new(bounds.x as i32, bounds.y as i32))
}

/// Arrange records row-major into `columns` columns starting at `origin`.
///
/// Each column is as wide as its widest record and each row as tall as its
/// tallest record, so mixed sizes never overlap.
pub fn arrange_grid_at(
    records: &mut [WidgetRecord],
    columns: usize,
    spacing: u32,
    origin: Position,
) -> LayoutResult<()> {
    require_records(records, "grid arrangement")?;
    if columns == 0 {
        return Err(LayoutError::invalid("columns must be at least 1"));
    }

    let rows = records.len().div_ceil(columns);
    let mut col_widths = vec![0i64; columns.min(records.len())];
    let mut row_heights = vec![0i64; rows];
    for (i, record) in records.iter().enumerate() {
        let (row, col) = (i / columns, i % columns);
        col_widths[col] = col_widths[col].max(record.size.width as i64);
        row_heights[row] = row_heights[row].max(record.size.height as i64);
    }

    let spacing = spacing as i64;
    let col_x: Vec<i64> = offsets(&col_widths, origin.x as i64, spacing);
    let row_y: Vec<i64> = offsets(&row_heights, origin.y as i64, spacing);
    log::debug!("Arranging {} widget(s) in {} column(s)", records.len(), columns);

    for (i, record) in records.iter_mut().enumerate() {
        let (row, col) = (i / columns, i % columns);
        record.position = Position::new(col_x[col] as i32, row_y[row] as i32);
    }
    Ok(())
}

/// Running start offsets for a sequence of cell extents.
fn offsets(extents: &[i64], origin: i64, spacing: i64) -> Vec<i64> {
    let mut cursor = origin;
    extents
        .iter()
        .map(|&extent| {
            let at = cursor;
            cursor += extent + spacing;
            at
        })
        .collect()
}

/// Place records evenly on a circle, the first at angle 0 (pointing along +x).
///
/// Each record's top-left corner goes to `center + radius * (cos, sin)`. Use
/// [`arrange_circular_centered`] to put the records' centers on the circle.
pub fn arrange_circular(
    records: &mut [WidgetRecord],
    center: Position,
    radius: i32,
) -> LayoutResult<()> {
    place_on_circle(records, center, radius, false)
}

/// Like [`arrange_circular`], but each record's center lands on the circle,
/// offset by half its width and height.
pub fn arrange_circular_centered(
    records: &mut [WidgetRecord],
    center: Position,
    radius: i32,
) -> LayoutResult<()> {
    place_on_circle(records, center, radius, true)
}

fn place_on_circle(
    records: &mut [WidgetRecord],
    center: Position,
    radius: i32,
    centered: bool,
) -> LayoutResult<()> {
    require_records(records, "circular arrangement")?;
    if radius <= 0 {
        return Err(LayoutError::invalid("radius must be positive"));
    }

    let step = TAU / records.len() as f64;
    let r = radius as f64;
    log::debug!("Arranging {} widget(s) on a circle of radius {}", records.len(), radius);
    for (i, record) in records.iter_mut().enumerate() {
        let angle = step * i as f64;
        let (half_w, half_h) = if centered {
            ((record.size.width / 2) as i32, (record.size.height / 2) as i32)
        } else {
            (0, 0)
        };
        record.position = Position::new(
            (center.x as f64 + r * angle.cos()).round() as i32 - half_w,
            (center.y as f64 + r * angle.sin()).round() as i32 - half_h,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Size;

    fn rec(x: i32, y: i32, w: u32, h: u32) -> WidgetRecord {
        WidgetRecord::new("button", Size::new(w, h)).at(Position::new(x, y))
    }

    fn xs(records: &[WidgetRecord]) -> Vec<i32> {
        records.iter().map(|r| r.position.x).collect()
    }

    fn ys(records: &[WidgetRecord]) -> Vec<i32> {
        records.iter().map(|r| r.position.y).collect()
    }

    #[test]
    fn test_align_left_and_idempotent() {
        let mut records = vec![rec(30, 0, 10, 10), rec(10, 50, 20, 10), rec(60, 90, 5, 5)];
        align_widgets(&mut records, Edge::Left).unwrap();
        assert_eq!(xs(&records), vec![10, 10, 10]);
        assert_eq!(ys(&records), vec![0, 50, 90]);

        let once = records.clone();
        align_widgets(&mut records, Edge::Left).unwrap();
        assert_eq!(records, once);
    }

    #[test]
    fn test_align_right_and_bottom() {
        let mut records = vec![rec(0, 0, 50, 20), rec(100, 40, 20, 40)];
        align_widgets(&mut records, Edge::Right).unwrap();
        assert_eq!(xs(&records), vec![70, 100]);
        align_widgets(&mut records, Edge::Bottom).unwrap();
        assert_eq!(ys(&records), vec![60, 40]);
    }

    #[test]
    fn test_align_center_is_idempotent() {
        let mut records = vec![rec(0, 0, 51, 10), rec(200, 0, 20, 10), rec(90, 0, 7, 10)];
        align_widgets(&mut records, Edge::CenterHorizontal).unwrap();
        // bounding box 0..220, midpoint 110
        assert_eq!(xs(&records), vec![85, 100, 107]);
        let once = records.clone();
        align_widgets(&mut records, Edge::CenterHorizontal).unwrap();
        assert_eq!(records, once);
    }

    #[test]
    fn test_align_empty_is_invalid() {
        let mut records: Vec<WidgetRecord> = Vec::new();
        assert!(matches!(
            align_widgets(&mut records, Edge::Top),
            Err(LayoutError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_distribute_horizontal() {
        let mut records = vec![rec(0, 0, 20, 10), rec(50, 0, 20, 10), rec(200, 0, 20, 10)];
        distribute_widgets(&mut records, Axis::Horizontal).unwrap();
        assert_eq!(xs(&records), vec![0, 100, 200]);
        // Equal gaps: 100 - 20 == 200 - 120
        assert_eq!(records[1].position.x - 20, 200 - (records[1].position.x + 20));
    }

    #[test]
    fn test_distribute_sorts_by_position_but_keeps_slice_order() {
        let mut records = vec![rec(0, 300, 10, 10), rec(0, 0, 10, 10), rec(0, 10, 10, 30)];
        distribute_widgets(&mut records, Axis::Vertical).unwrap();
        // Sorted: y=0 (h10), y=10 (h30), y=300. Span 0..310, gap (310-50)/2 = 130.
        assert_eq!(ys(&records), vec![300, 0, 140]);
    }

    #[test]
    fn test_distribute_fewer_than_three_is_noop() {
        let mut records = vec![rec(0, 0, 10, 10), rec(77, 0, 10, 10)];
        let before = records.clone();
        distribute_widgets(&mut records, Axis::Horizontal).unwrap();
        assert_eq!(records, before);
    }

    #[test]
    fn test_resize_uniform() {
        let mut records = vec![rec(0, 0, 10, 40), rec(5, 5, 30, 20)];
        resize_uniform(&mut records, Dimension::Width).unwrap();
        assert_eq!(records[0].size, Size::new(30, 40));
        assert_eq!(records[1].size, Size::new(30, 20));
        resize_uniform(&mut records, Dimension::Both).unwrap();
        assert_eq!(records[1].size, Size::new(30, 40));
        assert_eq!(records[1].position, Position::new(5, 5));
    }

    #[test]
    fn test_resize_uniform_skips_fixed_size() {
        let mut fixed = rec(0, 0, 10, 10);
        fixed.flags.resizable = false;
        let mut records = vec![fixed, rec(0, 0, 50, 50)];
        resize_uniform(&mut records, Dimension::Both).unwrap();
        assert_eq!(records[0].size, Size::new(10, 10));
    }

    #[test]
    fn test_arrange_grid_ragged() {
        let mut records = vec![
            rec(10, 10, 100, 30),
            rec(0, 0, 50, 60),
            rec(0, 0, 80, 20),
            rec(0, 0, 120, 40),
            rec(0, 0, 10, 10),
        ];
        arrange_grid(&mut records, 2, 5).unwrap();
        // Columns: max(100, 80, 10) = 100, max(50, 120) = 120. Rows: 60, 40, 10.
        // Origin is the group's top-left corner (0, 0).
        let positions: Vec<_> = records.iter().map(|r| r.position).collect();
        assert_eq!(
            positions,
            vec![
                Position::new(0, 0),
                Position::new(105, 0),
                Position::new(0, 65),
                Position::new(105, 65),
                Position::new(0, 110),
            ]
        );
    }

    #[test]
    fn test_arrange_grid_rejects_zero_columns() {
        let mut records = vec![rec(0, 0, 10, 10)];
        assert!(arrange_grid(&mut records, 0, 10).is_err());
        assert_eq!(records[0].position, Position::new(0, 0));
    }

    #[test]
    fn test_arrange_grid_at_origin() {
        let mut records = vec![rec(500, 500, 10, 10), rec(0, 0, 10, 10)];
        arrange_grid_at(&mut records, 4, 0, Position::new(20, 20)).unwrap();
        assert_eq!(xs(&records), vec![20, 30]);
        assert_eq!(ys(&records), vec![20, 20]);
    }

    #[test]
    fn test_arrange_circular() {
        let mut records = vec![rec(0, 0, 10, 10); 4];
        arrange_circular(&mut records, Position::new(100, 100), 50).unwrap();
        let positions: Vec<_> = records.iter().map(|r| r.position).collect();
        assert_eq!(
            positions,
            vec![
                Position::new(150, 100),
                Position::new(100, 150),
                Position::new(50, 100),
                Position::new(100, 50),
            ]
        );
    }

    #[test]
    fn test_arrange_circular_single_and_invalid_radius() {
        let mut records = vec![rec(0, 0, 10, 10)];
        arrange_circular(&mut records, Position::new(0, 0), 30).unwrap();
        assert_eq!(records[0].position, Position::new(30, 0));
        assert!(arrange_circular(&mut records, Position::new(0, 0), 0).is_err());
        assert!(arrange_circular(&mut records, Position::new(0, 0), -5).is_err());
    }

    #[test]
    fn test_arrange_circular_centered() {
        let mut records = vec![rec(0, 0, 20, 10), rec(0, 0, 40, 30)];
        arrange_circular_centered(&mut records, Position::new(100, 100), 50).unwrap();
        assert_eq!(records[0].position, Position::new(140, 95));
        assert_eq!(records[1].position, Position::new(30, 85));
        assert!(arrange_circular_centered(&mut records, Position::new(0, 0), 0).is_err());
        assert!(arrange_circular_centered(&mut [], Position::new(0, 0), 10).is_err());
    }
}
