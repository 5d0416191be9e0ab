//! The drop zone: owner of widget membership, z-order and selection.

mod placement;
mod selection;

pub use placement::{LayoutMode, default_position};
pub use selection::SelectionSet;

use crate::config::DropZoneConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::events::{EventBus, payload, types};
use crate::widget::{Position, Rect, Size, WidgetId, WidgetRecord};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::rc::Rc;

/// Container-level settings captured with a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneSettings {
    pub grid_size: u32,
    pub grid_visible: bool,
    pub layout_mode: LayoutMode,
}

/// A copy of a zone's records (in z-order) and settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSnapshot {
    pub records: Vec<WidgetRecord>,
    pub settings: ZoneSettings,
}

/// Bounded surface holding widget records.
///
/// Handlers on the zone's bus run while the zone is mutably borrowed, so they
/// observe events but cannot call back into the zone.
pub struct DropZone {
    /// Records in z-order, bottom first.
    records: Vec<WidgetRecord>,
    selection: SelectionSet,
    /// Ids removed during this zone's lifetime. Never reused.
    retired: HashSet<WidgetId>,
    settings: ZoneSettings,
    config: DropZoneConfig,
    bus: Rc<EventBus>,
}

impl std::fmt::Debug for DropZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropZone")
            .field("records", &self.records.len())
            .field("selected", &self.selection.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Default for DropZone {
    fn default() -> Self {
        Self::new(DropZoneConfig::default())
    }
}

impl DropZone {
    /// Create a zone with its own event bus.
    pub fn new(config: DropZoneConfig) -> Self {
        let bus = EventBus::shared(config.events.clone());
        Self::with_bus(config, bus)
    }

    /// Create a zone announcing changes on an existing bus.
    pub fn with_bus(config: DropZoneConfig, bus: Rc<EventBus>) -> Self {
        let settings = ZoneSettings {
            grid_size: config.grid_size.max(1),
            grid_visible: config.grid_visible,
            layout_mode: config.layout_mode,
        };
        Self {
            records: Vec::new(),
            selection: SelectionSet::new(),
            retired: HashSet::new(),
            settings,
            config,
            bus,
        }
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn config(&self) -> &DropZoneConfig {
        &self.config
    }

    pub fn settings(&self) -> ZoneSettings {
        self.settings
    }

    pub fn grid_size(&self) -> u32 {
        self.settings.grid_size
    }

    pub fn grid_visible(&self) -> bool {
        self.settings.grid_visible
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.settings.layout_mode
    }

    /// Surface size, if the zone is bounded.
    pub fn bounds(&self) -> Option<Size> {
        self.config.bounds
    }

    pub fn set_bounds(&mut self, bounds: Option<Size>) {
        self.config.bounds = bounds;
    }

    /// Check whether a rectangle lies inside the surface. Always true when unbounded.
    pub fn in_bounds(&self, rect: &Rect) -> bool {
        match self.config.bounds {
            Some(size) => Rect::new(Position::ORIGIN, size).contains_rect(rect),
            None => true,
        }
    }

    pub(crate) fn emit(&self, event_type: &str, source: Option<&WidgetId>, data: Value) {
        self.bus.emit(event_type, source, payload(data));
    }

    // --- Records ---

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in z-order (back to front).
    pub fn records(&self) -> &[WidgetRecord] {
        &self.records
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: &WidgetId) -> Option<&WidgetRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &WidgetId) -> Option<&mut WidgetRecord> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    fn index_of(&self, id: &WidgetId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    fn renumber(&mut self) {
        for (z, record) in self.records.iter_mut().enumerate() {
            record.set_z_index(z);
        }
    }

    /// Add a record on top of the z-order.
    ///
    /// Without an explicit position the zone's layout mode picks one.
    /// Fails if the id is already present or was used earlier in this zone.
    pub fn add(
        &mut self,
        mut record: WidgetRecord,
        position: Option<Position>,
    ) -> LayoutResult<WidgetId> {
        let id = record.id().clone();
        if self.contains(&id) {
            return Err(LayoutError::invalid(format!("widget id \"{}\" already present", id)));
        }
        if self.retired.contains(&id) {
            return Err(LayoutError::invalid(format!("widget id \"{}\" was already used", id)));
        }

        record.position = match position {
            Some(p) => p,
            None => default_position(
                self.settings.layout_mode,
                &self.records,
                record.size,
                &self.config.placement,
                self.config.bounds,
            ),
        };
        record.set_selected(false);
        record.set_z_index(self.records.len());
        let (x, y, kind) = (record.position.x, record.position.y, record.kind.clone());
        self.records.push(record);
        log::debug!("Added widget {} ({}) at ({}, {})", id, kind, x, y);

        self.emit(types::WIDGET_DROPPED, Some(&id), json!({ "x": x, "y": y, "kind": kind }));
        self.emit(types::LAYOUT_CHANGED, None, json!({ "count": self.records.len() }));
        Ok(id)
    }

    fn take(&mut self, index: usize) -> WidgetRecord {
        let mut record = self.records.remove(index);
        self.selection.deselect(record.id());
        record.set_selected(false);
        self.retired.insert(record.id().clone());
        record
    }

    /// Remove a record, dropping it from the selection.
    pub fn remove(&mut self, id: &WidgetId) -> LayoutResult<WidgetRecord> {
        let index = self.index_of(id).ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        let record = self.take(index);
        self.renumber();
        log::debug!("Removed widget {}", id);

        self.emit(types::WIDGET_REMOVED, Some(id), json!({ "kind": record.kind }));
        self.emit(types::LAYOUT_CHANGED, None, json!({ "count": self.records.len() }));
        Ok(record)
    }

    /// Remove every selected, deletable record. Returns the removed ids.
    pub fn delete_selected(&mut self) -> Vec<WidgetId> {
        let doomed: Vec<WidgetId> = self
            .records
            .iter()
            .filter(|r| self.selection.contains(r.id()) && r.flags.deletable)
            .map(|r| r.id().clone())
            .collect();
        if doomed.is_empty() {
            return doomed;
        }

        let mut removed = Vec::with_capacity(doomed.len());
        for id in &doomed {
            if let Some(index) = self.index_of(id) {
                removed.push(self.take(index));
            }
        }
        self.renumber();
        log::debug!("Deleted {} selected widget(s)", removed.len());

        for record in &removed {
            self.emit(types::WIDGET_REMOVED, Some(record.id()), json!({ "kind": record.kind }));
        }
        self.emit(types::LAYOUT_CHANGED, None, json!({ "count": self.records.len() }));
        doomed
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        let removed: Vec<WidgetRecord> = std::mem::take(&mut self.records);
        self.selection.clear();
        for record in &removed {
            self.retired.insert(record.id().clone());
        }
        log::debug!("Cleared drop zone ({} widget(s))", removed.len());

        for record in &removed {
            self.emit(types::WIDGET_REMOVED, Some(record.id()), json!({ "kind": record.kind }));
        }
        self.emit(types::DROP_ZONE_CLEARED, None, json!({ "count": removed.len() }));
    }

    /// Move a record to a new position.
    pub fn move_widget(&mut self, id: &WidgetId, position: Position) -> LayoutResult<()> {
        let record = self.get_mut(id).ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        let old = record.position;
        if old == position {
            return Ok(());
        }
        record.position = position;
        self.emit(
            types::WIDGET_MOVED,
            Some(id),
            json!({ "x": position.x, "y": position.y, "old_x": old.x, "old_y": old.y }),
        );
        Ok(())
    }

    /// Resize a record, keeping its top-left corner.
    pub fn resize_widget(&mut self, id: &WidgetId, size: Size) -> LayoutResult<()> {
        let record = self.get_mut(id).ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        if !record.flags.resizable {
            return Err(LayoutError::invalid(format!("widget \"{}\" is not resizable", id)));
        }
        let old = record.size;
        if old == size {
            return Ok(());
        }
        record.size = size;
        self.emit(
            types::WIDGET_RESIZED,
            Some(id),
            json!({
                "width": size.width,
                "height": size.height,
                "old_width": old.width,
                "old_height": old.height,
            }),
        );
        Ok(())
    }

    /// Set one metadata value on a record.
    pub fn set_metadata(
        &mut self,
        id: &WidgetId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> LayoutResult<()> {
        let record = self.get_mut(id).ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        record.metadata.insert(key.into(), value.into());
        Ok(())
    }

    // --- Selection ---

    fn selection_changed(&self) {
        let ids: Vec<&str> = self.selected_ids_iter().map(WidgetId::as_str).collect();
        self.emit(types::SELECTION_CHANGED, None, json!({ "selected": ids }));
    }

    fn selected_ids_iter(&self) -> impl Iterator<Item = &WidgetId> {
        self.records
            .iter()
            .filter(|r| self.selection.contains(r.id()))
            .map(WidgetRecord::id)
    }

    /// Select or deselect a record.
    ///
    /// Non-additive selection replaces the current selection.
    pub fn set_selected(
        &mut self,
        id: &WidgetId,
        selected: bool,
        additive: bool,
    ) -> LayoutResult<()> {
        if !self.contains(id) {
            return Err(LayoutError::NotFound(id.clone()));
        }
        match (selected, additive) {
            (true, false) => self.selection.select(id.clone()),
            (true, true) => {
                self.selection.add(id.clone());
            }
            (false, _) => {
                self.selection.deselect(id);
            }
        }
        self.sync_selection_flags();
        self.selection_changed();
        Ok(())
    }

    pub fn select_all(&mut self) {
        for record in &self.records {
            self.selection.add(record.id().clone());
        }
        self.sync_selection_flags();
        self.selection_changed();
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection.clear();
        self.sync_selection_flags();
        self.selection_changed();
    }

    fn sync_selection_flags(&mut self) {
        let selection = &self.selection;
        for record in &mut self.records {
            let selected = selection.contains(record.id());
            record.set_selected(selected);
        }
    }

    pub fn is_selected(&self, id: &WidgetId) -> bool {
        self.selection.contains(id)
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Selected ids in z-order.
    pub fn selected_ids(&self) -> Vec<WidgetId> {
        self.selected_ids_iter().cloned().collect()
    }

    /// Selected records in z-order.
    pub fn selected_records(&self) -> Vec<&WidgetRecord> {
        self.records.iter().filter(|r| self.selection.contains(r.id())).collect()
    }

    // --- Z-order ---

    /// Bring a record to the front (topmost).
    pub fn bring_to_front(&mut self, id: &WidgetId) -> LayoutResult<()> {
        let index = self.index_of(id).ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        let record = self.records.remove(index);
        self.records.push(record);
        self.renumber();
        Ok(())
    }

    /// Send a record to the back (bottommost).
    pub fn send_to_back(&mut self, id: &WidgetId) -> LayoutResult<()> {
        let index = self.index_of(id).ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        let record = self.records.remove(index);
        self.records.insert(0, record);
        self.renumber();
        Ok(())
    }

    /// Move a record one layer forward.
    /// Returns false if it is already at the front.
    pub fn bring_forward(&mut self, id: &WidgetId) -> LayoutResult<bool> {
        let index = self.index_of(id).ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        if index + 1 >= self.records.len() {
            return Ok(false);
        }
        self.records.swap(index, index + 1);
        self.renumber();
        Ok(true)
    }

    /// Move a record one layer backward.
    /// Returns false if it is already at the back.
    pub fn send_backward(&mut self, id: &WidgetId) -> LayoutResult<bool> {
        let index = self.index_of(id).ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        if index == 0 {
            return Ok(false);
        }
        self.records.swap(index, index - 1);
        self.renumber();
        Ok(true)
    }

    // --- Settings ---

    /// Change the placement policy. Existing widgets stay where they are.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if self.settings.layout_mode == mode {
            return;
        }
        self.settings.layout_mode = mode;
        log::debug!("Layout mode set to {}", mode);
        self.emit(types::LAYOUT_MODE_CHANGED, None, json!({ "mode": mode.as_str() }));
    }

    pub fn set_grid_size(&mut self, grid_size: u32) -> LayoutResult<()> {
        if grid_size == 0 {
            return Err(LayoutError::invalid("grid size must be positive"));
        }
        self.settings.grid_size = grid_size;
        Ok(())
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        if self.settings.grid_visible == visible {
            return;
        }
        self.settings.grid_visible = visible;
        self.emit(types::GRID_TOGGLED, None, json!({ "visible": visible }));
    }

    // --- Snapshots ---

    /// Copy the zone's records and settings.
    pub fn snapshot(&self) -> ZoneSnapshot {
        ZoneSnapshot {
            records: self.records.clone(),
            settings: self.settings,
        }
    }

    /// Replace the zone's contents with a snapshot.
    ///
    /// Selection is cleared. Ids present before the restore but absent from the
    /// snapshot count as removed and cannot be added again.
    /// Fails without touching the zone if the snapshot is inconsistent.
    pub fn restore(&mut self, snapshot: ZoneSnapshot) -> LayoutResult<()> {
        if snapshot.settings.grid_size == 0 {
            return Err(LayoutError::invalid("grid size must be positive"));
        }
        let mut seen = HashSet::new();
        for record in &snapshot.records {
            if !seen.insert(record.id()) {
                return Err(LayoutError::invalid(format!(
                    "duplicate widget id \"{}\"",
                    record.id()
                )));
            }
        }

        // Ids dropped by the restore are retired; ids it brings back are live again.
        for record in &self.records {
            if !seen.contains(record.id()) {
                self.retired.insert(record.id().clone());
            }
        }
        for id in &seen {
            self.retired.remove(*id);
        }

        self.records = snapshot.records;
        for record in &mut self.records {
            record.set_selected(false);
        }
        self.renumber();
        self.selection.clear();
        self.settings = snapshot.settings;
        log::debug!("Restored drop zone with {} widget(s)", self.records.len());

        self.emit(types::LAYOUT_LOADED, None, json!({ "count": self.records.len() }));
        Ok(())
    }

    // --- Arrangement ---

    /// Run a layout algorithm over the selected records.
    ///
    /// The algorithm works on copies in z-order; results are written back only
    /// if it succeeds. Returns the number of records that changed.
    pub fn arrange_selected<F>(&mut self, op: F) -> LayoutResult<usize>
    where
        F: FnOnce(&mut [WidgetRecord]) -> LayoutResult<()>,
    {
        let mut working: Vec<WidgetRecord> = self.selected_records().into_iter().cloned().collect();
        op(&mut working)?;

        let mut changed = 0;
        for updated in working {
            let Some(index) = self.index_of(updated.id()) else {
                continue;
            };
            let (old_pos, old_size) = (self.records[index].position, self.records[index].size);
            let (new_pos, new_size) = (updated.position, updated.size);
            if old_pos == new_pos && old_size == new_size {
                continue;
            }
            self.records[index].position = new_pos;
            self.records[index].size = new_size;
            changed += 1;

            let id = updated.id();
            if old_pos != new_pos {
                self.emit(
                    types::WIDGET_MOVED,
                    Some(id),
                    json!({
                        "x": new_pos.x,
                        "y": new_pos.y,
                        "old_x": old_pos.x,
                        "old_y": old_pos.y,
                    }),
                );
            }
            if old_size != new_size {
                self.emit(
                    types::WIDGET_RESIZED,
                    Some(id),
                    json!({
                        "width": new_size.width,
                        "height": new_size.height,
                        "old_width": old_size.width,
                        "old_height": old_size.height,
                    }),
                );
            }
        }
        log::debug!("Arrangement changed {} widget(s)", changed);
        self.emit(
            types::LAYOUT_CHANGED,
            None,
            json!({ "count": self.records.len(), "changed": changed }),
        );
        Ok(changed)
    }
}
