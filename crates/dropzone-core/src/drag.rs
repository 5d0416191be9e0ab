//! Pointer-driven move and resize gestures.
//!
//! A [`DragController`] turns pointer samples into position and size changes
//! on records owned by a [`DropZone`]. Each gesture walks
//! `Idle -> Armed -> Dragging -> Settling -> Idle`:
//!
//! - `Armed` after a press on a draggable (or resizable, for handles) record.
//! - `Dragging` once the pointer has travelled further than the threshold.
//!   Releasing before that is a click.
//! - `Settling` after release while the records ease towards their snapped
//!   targets. The host drives the animation with [`DragController::advance`];
//!   with a zero settle duration this state is skipped.

use crate::config::DragConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::events::types;
use crate::snap::snap_to_grid;
use crate::widget::{HandleKind, Position, Rect, Size, WidgetId, apply_resize, snap_resize};
use crate::zone::DropZone;
use kurbo::{Point, Vec2};
use serde_json::{Value, json};
use std::time::Duration;

/// What a gesture changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Translate the record (and the rest of the selection, for group drags).
    Move,
    /// Resize the record by dragging one of its handles.
    Resize(HandleKind),
}

/// Geometry of a record when the gesture began.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: WidgetId,
    pub position: Position,
    pub size: Size,
}

/// State for one gesture.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// The record the pointer went down on.
    pub primary: WidgetId,
    pub gesture: Gesture,
    /// Starting point of the drag.
    pub start_point: Point,
    /// Current point of the drag.
    pub current_point: Point,
    /// Every record the gesture moves, primary included, in z-order.
    pub participants: Vec<Participant>,
}

impl DragSession {
    /// Get the drag delta.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Drag delta rounded to whole pixels.
    pub fn pixel_delta(&self) -> (i32, i32) {
        let delta = self.delta();
        (delta.x.round() as i32, delta.y.round() as i32)
    }

    /// Manhattan length of the delta.
    pub fn distance(&self) -> f64 {
        let delta = self.delta();
        delta.x.abs() + delta.y.abs()
    }

    pub fn is_group(&self) -> bool {
        self.participants.len() > 1
    }
}

/// Where a record ends up once the gesture settles.
#[derive(Debug, Clone, PartialEq)]
pub struct SettleTarget {
    pub id: WidgetId,
    pub from_position: Position,
    pub from_size: Size,
    pub to_position: Position,
    pub to_size: Size,
}

impl SettleTarget {
    fn is_noop(&self) -> bool {
        self.from_position == self.to_position && self.from_size == self.to_size
    }

    /// Interpolated geometry at eased progress `t` in `0.0..=1.0`.
    fn at(&self, t: f64) -> (Position, Size) {
        let lerp = |a: i64, b: i64| (a as f64 + (b - a) as f64 * t).round() as i64;
        let position = Position::new(
            lerp(self.from_position.x as i64, self.to_position.x as i64) as i32,
            lerp(self.from_position.y as i64, self.to_position.y as i64) as i32,
        );
        let size = Size::new(
            lerp(self.from_size.width as i64, self.to_size.width as i64) as u32,
            lerp(self.from_size.height as i64, self.to_size.height as i64) as u32,
        );
        (position, size)
    }
}

/// Gesture state.
#[derive(Debug, Clone, Default)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Pointer is down but has not moved past the threshold.
    Armed(DragSession),
    /// Records follow the pointer.
    Dragging(DragSession),
    /// Pointer released; records ease towards their targets.
    Settling {
        session: DragSession,
        targets: Vec<SettleTarget>,
        elapsed: Duration,
        duration: Duration,
    },
}

/// Discriminant of [`DragState`], for hosts that only need the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Armed,
    Dragging,
    Settling,
}

/// Ease-out cubic: fast start, gentle stop.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Converts pointer samples into record mutations.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    config: DragConfig,
    state: DragState,
}

impl DragController {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
        }
    }

    /// Controller using the drag settings of a zone's configuration.
    pub fn for_zone(zone: &DropZone) -> Self {
        Self::new(zone.config().drag.clone())
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn phase(&self) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Armed(_) => DragPhase::Armed,
            DragState::Dragging(_) => DragPhase::Dragging,
            DragState::Settling { .. } => DragPhase::Settling,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    /// The active gesture, if any.
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed(s) | DragState::Dragging(s) => Some(s),
            DragState::Settling { session, .. } => Some(session),
        }
    }

    /// Pointer went down over a record: arm a move gesture.
    ///
    /// If the record is selected along with others, the whole selection moves.
    /// Fails without any state change if the record is unknown or not draggable.
    pub fn begin(
        &mut self,
        zone: &mut DropZone,
        id: &WidgetId,
        pointer: Point,
    ) -> LayoutResult<()> {
        self.prepare_begin(zone)?;
        let record = zone.get(id).ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        if !record.flags.draggable {
            log::warn!("Rejected drag on non-draggable widget {}", id);
            return Err(LayoutError::invalid(format!("widget \"{}\" is not draggable", id)));
        }

        let participants: Vec<Participant> = if zone.is_selected(id) && zone.selection_len() > 1 {
            zone.selected_records()
                .into_iter()
                .filter(|r| r.flags.draggable)
                .map(|r| Participant {
                    id: r.id().clone(),
                    position: r.position,
                    size: r.size,
                })
                .collect()
        } else {
            vec![Participant {
                id: id.clone(),
                position: record.position,
                size: record.size,
            }]
        };

        log::debug!("Armed move of {} ({} widget(s))", id, participants.len());
        self.state = DragState::Armed(DragSession {
            primary: id.clone(),
            gesture: Gesture::Move,
            start_point: pointer,
            current_point: pointer,
            participants,
        });
        Ok(())
    }

    /// Pointer went down on a resize handle: arm a resize gesture.
    pub fn begin_resize(
        &mut self,
        zone: &mut DropZone,
        id: &WidgetId,
        handle: HandleKind,
        pointer: Point,
    ) -> LayoutResult<()> {
        self.prepare_begin(zone)?;
        let record = zone.get(id).ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        if !record.flags.resizable {
            log::warn!("Rejected resize on non-resizable widget {}", id);
            return Err(LayoutError::invalid(format!("widget \"{}\" is not resizable", id)));
        }

        log::debug!("Armed resize of {} from {}", id, handle.name());
        self.state = DragState::Armed(DragSession {
            primary: id.clone(),
            gesture: Gesture::Resize(handle),
            start_point: pointer,
            current_point: pointer,
            participants: vec![Participant {
                id: id.clone(),
                position: record.position,
                size: record.size,
            }],
        });
        Ok(())
    }

    /// A new press finishes any pending settle; a press during an active
    /// gesture is refused.
    fn prepare_begin(&mut self, zone: &mut DropZone) -> LayoutResult<()> {
        match self.state {
            DragState::Idle => Ok(()),
            DragState::Settling { .. } => {
                self.complete_settle(zone);
                Ok(())
            }
            DragState::Armed(_) | DragState::Dragging(_) => {
                Err(LayoutError::invalid("a gesture is already in progress"))
            }
        }
    }

    /// Feed a pointer sample. Returns false if the sample was ignored.
    pub fn update(&mut self, zone: &mut DropZone, pointer: Point) -> bool {
        match std::mem::take(&mut self.state) {
            DragState::Armed(mut session) => {
                session.current_point = pointer;
                if session.distance() > self.config.threshold as f64 {
                    announce_start(zone, &session);
                    self.apply_sample(zone, &session);
                    self.state = DragState::Dragging(session);
                } else {
                    self.state = DragState::Armed(session);
                }
                true
            }
            DragState::Dragging(mut session) => {
                session.current_point = pointer;
                self.apply_sample(zone, &session);
                self.state = DragState::Dragging(session);
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Pointer released. Returns false if the release was ignored.
    pub fn end(&mut self, zone: &mut DropZone, pointer: Point) -> bool {
        match std::mem::take(&mut self.state) {
            DragState::Armed(session) => {
                if session.gesture == Gesture::Move {
                    log::debug!("Click on {}", session.primary);
                    zone.emit(
                        types::WIDGET_CLICKED,
                        Some(&session.primary),
                        json!({ "x": pointer.x, "y": pointer.y }),
                    );
                }
                true
            }
            DragState::Dragging(mut session) => {
                if session.current_point != pointer {
                    session.current_point = pointer;
                    self.apply_sample(zone, &session);
                }
                let targets = self.settle_targets(zone, &session);
                let duration = self.config.settle_duration();
                if duration.is_zero() || targets.iter().all(SettleTarget::is_noop) {
                    finish(zone, &session, &targets);
                } else {
                    log::debug!("Settling {} widget(s) over {:?}", targets.len(), duration);
                    self.state = DragState::Settling {
                        session,
                        targets,
                        elapsed: Duration::ZERO,
                        duration,
                    };
                }
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Step the settle animation. Returns true while still settling.
    pub fn advance(&mut self, zone: &mut DropZone, dt: Duration) -> bool {
        let DragState::Settling {
            session,
            targets,
            elapsed,
            duration,
        } = std::mem::take(&mut self.state)
        else {
            return false;
        };

        let elapsed = elapsed + dt;
        if elapsed >= duration {
            finish(zone, &session, &targets);
            return false;
        }

        let t = ease_out_cubic(elapsed.as_secs_f64() / duration.as_secs_f64());
        for target in &targets {
            if let Some(record) = zone.get_mut(&target.id) {
                let (position, size) = target.at(t);
                record.position = position;
                record.size = size;
            }
        }
        self.state = DragState::Settling {
            session,
            targets,
            elapsed,
            duration,
        };
        true
    }

    /// Stop the current gesture early.
    ///
    /// A drag in progress is undone and announced as cancelled; a settle in
    /// progress jumps to its end and finishes normally.
    pub fn abort(&mut self, zone: &mut DropZone) {
        match std::mem::take(&mut self.state) {
            DragState::Idle => {}
            DragState::Armed(session) => {
                log::debug!("Disarmed gesture on {}", session.primary);
            }
            DragState::Dragging(session) => {
                for p in &session.participants {
                    if let Some(record) = zone.get_mut(&p.id) {
                        record.position = p.position;
                        record.size = p.size;
                    }
                }
                log::debug!("Cancelled drag of {}", session.primary);
                zone.emit(
                    types::DRAG_CANCELLED,
                    Some(&session.primary),
                    json!({ "widgets": participant_ids(&session) }),
                );
            }
            settling @ DragState::Settling { .. } => {
                self.state = settling;
                self.complete_settle(zone);
            }
        }
    }

    fn complete_settle(&mut self, zone: &mut DropZone) {
        if let DragState::Settling { session, targets, .. } = std::mem::take(&mut self.state) {
            finish(zone, &session, &targets);
        }
    }

    /// Apply the session's current delta to every participant.
    fn apply_sample(&self, zone: &mut DropZone, session: &DragSession) {
        let (dx, dy) = session.pixel_delta();
        match session.gesture {
            Gesture::Move => {
                for p in &session.participants {
                    if let Some(record) = zone.get_mut(&p.id) {
                        record.position = p.position.offset(dx, dy);
                    }
                }
                let Some(primary) = zone.get(&session.primary) else {
                    return;
                };
                let (x, y) = (primary.position.x, primary.position.y);
                zone.emit(
                    types::DRAG_MOVED,
                    Some(&session.primary),
                    json!({ "x": x, "y": y, "dx": dx, "dy": dy }),
                );
            }
            Gesture::Resize(handle) => {
                let Some(p) = session.participants.first() else {
                    return;
                };
                let (position, size) =
                    apply_resize(p.position, p.size, handle, dx, dy, self.config.min_size);
                let Some(record) = zone.get_mut(&p.id) else {
                    return;
                };
                record.position = position;
                record.size = size;
                zone.emit(
                    types::WIDGET_RESIZED,
                    Some(&p.id),
                    json!({
                        "x": position.x,
                        "y": position.y,
                        "width": size.width,
                        "height": size.height,
                    }),
                );
            }
        }
    }

    /// Final geometry for each participant still in the zone.
    ///
    /// Snapping uses each record's own settings. A record whose target leaves
    /// a bounded surface goes back to where the gesture found it.
    fn settle_targets(&self, zone: &DropZone, session: &DragSession) -> Vec<SettleTarget> {
        let mut targets = Vec::with_capacity(session.participants.len());
        for p in &session.participants {
            let Some(record) = zone.get(&p.id) else {
                continue;
            };
            let snap = record.snap;
            let (mut to_position, mut to_size) = match session.gesture {
                Gesture::Move if snap.is_active() => {
                    (snap_to_grid(record.position, snap.grid_size).position, record.size)
                }
                Gesture::Resize(handle) if snap.is_active() => {
                    let min_size = self.config.min_size;
                    snap_resize(record.position, record.size, handle, snap.grid_size, min_size)
                }
                _ => (record.position, record.size),
            };
            if !zone.in_bounds(&Rect::new(to_position, to_size)) {
                log::warn!("Widget {} dropped outside the zone, reverting", p.id);
                to_position = p.position;
                to_size = p.size;
            }
            targets.push(SettleTarget {
                id: p.id.clone(),
                from_position: record.position,
                from_size: record.size,
                to_position,
                to_size,
            });
        }
        targets
    }
}

fn participant_ids(session: &DragSession) -> Vec<&str> {
    session.participants.iter().map(|p| p.id.as_str()).collect()
}

fn announce_start(zone: &DropZone, session: &DragSession) {
    let Some(p) = session.participants.iter().find(|p| p.id == session.primary) else {
        return;
    };
    match session.gesture {
        Gesture::Move => {
            log::debug!(
                "Drag started on {} ({} widget(s))",
                session.primary,
                session.participants.len()
            );
            zone.emit(
                types::DRAG_STARTED,
                Some(&session.primary),
                json!({
                    "x": p.position.x,
                    "y": p.position.y,
                    "count": session.participants.len(),
                    "widgets": participant_ids(session),
                }),
            );
        }
        Gesture::Resize(handle) => {
            log::debug!("Resize started on {} from {}", session.primary, handle.name());
            zone.emit(
                types::RESIZE_STARTED,
                Some(&session.primary),
                json!({ "handle": handle.name(), "width": p.size.width, "height": p.size.height }),
            );
        }
    }
}

/// Put every record at its target and announce the end of the gesture.
fn finish(zone: &mut DropZone, session: &DragSession, targets: &[SettleTarget]) {
    for target in targets {
        if let Some(record) = zone.get_mut(&target.id) {
            record.position = target.to_position;
            record.size = target.to_size;
        }
    }

    match session.gesture {
        Gesture::Move => {
            for p in &session.participants {
                let Some(target) = targets.iter().find(|t| t.id == p.id) else {
                    continue;
                };
                if target.to_position != p.position {
                    zone.emit(
                        types::WIDGET_MOVED,
                        Some(&p.id),
                        json!({
                            "x": target.to_position.x,
                            "y": target.to_position.y,
                            "old_x": p.position.x,
                            "old_y": p.position.y,
                        }),
                    );
                }
            }

            let widgets: Vec<Value> = targets
                .iter()
                .map(|t| json!({ "id": t.id.as_str(), "x": t.to_position.x, "y": t.to_position.y }))
                .collect();
            let mut data = json!({ "widgets": widgets });
            if let Some(primary) = targets.iter().find(|t| t.id == session.primary) {
                data["x"] = json!(primary.to_position.x);
                data["y"] = json!(primary.to_position.y);
            }
            log::debug!("Drag finished on {}", session.primary);
            zone.emit(types::DRAG_FINISHED, Some(&session.primary), data);
        }
        Gesture::Resize(handle) => {
            let Some(target) = targets.first() else {
                return;
            };
            log::debug!("Resize finished on {}", session.primary);
            zone.emit(
                types::RESIZE_FINISHED,
                Some(&session.primary),
                json!({
                    "handle": handle.name(),
                    "x": target.to_position.x,
                    "y": target.to_position.y,
                    "width": target.to_size.width,
                    "height": target.to_size.height,
                }),
            );
        }
    }
}
