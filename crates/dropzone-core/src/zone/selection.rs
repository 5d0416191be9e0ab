//! Selection set tracking which records are selected.

use crate::widget::WidgetId;
use std::collections::HashSet;

/// The ids currently selected in a zone.
///
/// The zone mirrors membership into each record's selection flag; this set is
/// the authoritative copy used for lookups.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    selected: HashSet<WidgetId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a single id, clearing any others.
    pub fn select(&mut self, id: WidgetId) {
        self.selected.clear();
        self.selected.insert(id);
    }

    /// Add an id to the selection. Returns true if it was not selected yet.
    pub fn add(&mut self, id: WidgetId) -> bool {
        self.selected.insert(id)
    }

    /// Remove an id from the selection. Returns true if it was selected.
    pub fn deselect(&mut self, id: &WidgetId) -> bool {
        self.selected.remove(id)
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.selected.contains(id)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetId> {
        self.selected.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_replaces() {
        let mut selection = SelectionSet::new();
        selection.add(WidgetId::new("a"));
        selection.add(WidgetId::new("b"));
        selection.select(WidgetId::new("c"));
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(&WidgetId::new("c")));
    }

    #[test]
    fn test_add_and_deselect() {
        let mut selection = SelectionSet::new();
        assert!(selection.add(WidgetId::new("a")));
        assert!(!selection.add(WidgetId::new("a")));
        assert!(selection.deselect(&WidgetId::new("a")));
        assert!(!selection.deselect(&WidgetId::new("a")));
        assert!(selection.is_empty());
    }
}
