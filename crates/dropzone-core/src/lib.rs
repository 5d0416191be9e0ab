//! Dropzone Core Library
//!
//! Interaction and layout engine for drag-and-drop widget surfaces: widget
//! records, a drop zone owning membership, z-order and selection, a drag
//! controller for move and resize gestures, bulk layout algorithms, an event
//! bus, and JSON/YAML layout persistence. Rendering is left to the host.

pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod layout;
pub mod serializer;
pub mod snap;
pub mod storage;
pub mod widget;
pub mod zone;

pub use config::{CancelPolicy, DragConfig, DropZoneConfig, EventBusConfig, PlacementConfig};
pub use drag::{DragController, DragPhase, DragSession, DragState, Gesture};
pub use error::{LayoutError, LayoutResult, ValidationIssue};
pub use events::{Event, EventBus, EventPriority, EventScope, SubscriptionId};
pub use layout::{Axis, Dimension, Edge};
pub use serializer::{LayoutDocument, LayoutStatistics, WidgetEntry};
pub use snap::{SnapResult, snap_to_grid, DEFAULT_GRID_SIZE};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use widget::{
    Handle, HandleKind, KindInfo, Metadata, Position, Rect, Size, SnapSettings, WidgetFlags,
    WidgetId, WidgetRecord, WidgetRegistry,
};
pub use zone::{DropZone, LayoutMode, SelectionSet, ZoneSettings, ZoneSnapshot};
