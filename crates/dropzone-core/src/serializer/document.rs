//! The portable layout document.

use crate::snap::DEFAULT_GRID_SIZE;
use crate::widget::{Metadata, Position, Size, SnapSettings, WidgetFlags, WidgetId, WidgetRecord};
use crate::zone::LayoutMode;
use serde::{Deserialize, Serialize};

/// Version written into new documents.
pub const FORMAT_VERSION: &str = "1.0.0";

/// Versions this build can read.
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0.0", "1.0"];

/// Library tag stamped into saved documents.
pub const LIBRARY_NAME: &str = "dropzone";

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

fn default_grid_size() -> u32 {
    DEFAULT_GRID_SIZE
}

fn default_true() -> bool {
    true
}

/// Serialized form of a drop zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    #[serde(default = "default_true")]
    pub grid_visible: bool,
    #[serde(default)]
    pub layout_mode: LayoutMode,
    /// Entries in z-order, bottom first.
    pub widgets: Vec<WidgetEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
}

impl Default for LayoutDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            grid_size: DEFAULT_GRID_SIZE,
            grid_visible: true,
            layout_mode: LayoutMode::Free,
            widgets: Vec::new(),
            metadata: None,
        }
    }
}

impl LayoutDocument {
    pub fn is_supported_version(&self) -> bool {
        SUPPORTED_VERSIONS.contains(&self.version.as_str())
    }

    pub fn entry(&self, id: &WidgetId) -> Option<&WidgetEntry> {
        self.widgets.iter().find(|e| &e.id == id)
    }

    /// Creation time recorded in the metadata block, if any.
    pub fn created_at(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.created_at.as_deref())
    }
}

/// Provenance block. Absent from freshly encoded documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// RFC 3339 timestamp of the save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    /// Creation times of the documents a merge was built from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_from: Vec<String>,
}

/// One widget in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetEntry {
    pub id: WidgetId,
    #[serde(alias = "type")]
    pub kind: String,
    pub position: Position,
    pub size: Size,
    #[serde(default)]
    pub flags: WidgetFlags,
    /// Only written when the record snaps differently from the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap: Option<SnapSettings>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl WidgetEntry {
    pub fn from_record(record: &WidgetRecord) -> Self {
        Self {
            id: record.id().clone(),
            kind: record.kind.clone(),
            position: record.position,
            size: record.size,
            flags: record.flags,
            snap: (record.snap != SnapSettings::default()).then_some(record.snap),
            metadata: record.metadata.clone(),
        }
    }

    pub fn to_record(&self) -> WidgetRecord {
        WidgetRecord::with_id(self.id.clone(), self.kind.clone(), self.size)
            .at(self.position)
            .with_flags(self.flags)
            .with_snap(self.snap.unwrap_or_default())
            .with_metadata(self.metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_accepts_type_alias() {
        let json = r#"{"id": "w1", "type": "button",
            "position": {"x": 1, "y": 2}, "size": {"width": 3, "height": 4}}"#;
        let entry: WidgetEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, "button");
        assert_eq!(entry.flags, WidgetFlags::default());
        assert!(entry.snap.is_none());
    }

    #[test]
    fn test_entry_record_conversion() {
        let record = WidgetRecord::new("label", Size::new(80, 30))
            .at(Position::new(5, 6))
            .with_snap(SnapSettings::grid(10))
            .with_meta("text", "Hi");
        let entry = WidgetEntry::from_record(&record);
        assert_eq!(entry.snap, Some(SnapSettings::grid(10)));
        let back = entry.to_record();
        assert_eq!(back.id(), record.id());
        assert_eq!(back.position, record.position);
        assert_eq!(back.snap, record.snap);
        assert_eq!(back.metadata, record.metadata);
    }

    #[test]
    fn test_document_defaults_and_metadata_omitted() {
        let doc = LayoutDocument::default();
        assert!(doc.is_supported_version());
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("metadata").is_none());
        assert_eq!(json["layout_mode"], "free");
    }
}
