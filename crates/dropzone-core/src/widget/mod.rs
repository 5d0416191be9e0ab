//! Widget records and the collaborators that describe them.
//!
//! Widgets are pure data: a [`WidgetRecord`] plus an opaque kind tag that a
//! [`WidgetRegistry`] resolves to defaults. Behaviour lives in the drag
//! controller, the drop zone and the layout algorithms.

mod handles;
mod record;
mod registry;

pub use handles::{Handle, HandleKind, apply_resize, handles_for, hit_test_handle, snap_resize};
pub use record::{Metadata, Position, Rect, Size, SnapSettings, WidgetFlags, WidgetId, WidgetRecord};
pub use registry::{KindInfo, WidgetRegistry};
