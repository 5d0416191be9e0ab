//! Layout snapshots to and from portable documents.
//!
//! [`encode`] and [`decode`] convert between a [`ZoneSnapshot`] and a
//! [`LayoutDocument`]; the remaining functions work on documents: validation,
//! merging, statistics, code export and JSON/YAML file IO.

mod document;
mod export;
mod validate;

pub use document::{
    DocumentMetadata, FORMAT_VERSION, LIBRARY_NAME, LayoutDocument, SUPPORTED_VERSIONS, WidgetEntry,
};
pub use export::export_as_code;
pub use validate::{check, check_document, validate};

use crate::error::{LayoutError, LayoutResult};
use crate::events::types;
use crate::layout::bounding_rect;
use crate::widget::{Rect, WidgetId, WidgetRecord, WidgetRegistry};
use crate::zone::{DropZone, LayoutMode, ZoneSettings, ZoneSnapshot};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Turn a zone snapshot into a document. Pure: no timestamps are added.
pub fn encode(snapshot: &ZoneSnapshot) -> LayoutDocument {
    LayoutDocument {
        version: FORMAT_VERSION.to_string(),
        grid_size: snapshot.settings.grid_size,
        grid_visible: snapshot.settings.grid_visible,
        layout_mode: snapshot.settings.layout_mode,
        widgets: snapshot.records.iter().map(WidgetEntry::from_record).collect(),
        metadata: None,
    }
}

/// Turn a document back into a snapshot ready for [`DropZone::restore`].
pub fn decode(doc: &LayoutDocument) -> LayoutResult<ZoneSnapshot> {
    check_document(doc)?;
    Ok(ZoneSnapshot {
        records: stacked(doc.widgets.iter().map(WidgetEntry::to_record).collect()),
        settings: settings_of(doc),
    })
}

/// Like [`decode`], but drops entries whose kind the registry does not know
/// and fills in each kind's default metadata.
pub fn decode_with_registry(
    doc: &LayoutDocument,
    registry: &WidgetRegistry,
) -> LayoutResult<ZoneSnapshot> {
    check_document(doc)?;
    let mut records = Vec::with_capacity(doc.widgets.len());
    for entry in &doc.widgets {
        let mut record = entry.to_record();
        if !registry.apply_defaults(&mut record) {
            log::warn!("Skipping widget {} of unknown kind '{}'", entry.id, entry.kind);
            continue;
        }
        records.push(record);
    }
    Ok(ZoneSnapshot {
        records: stacked(records),
        settings: settings_of(doc),
    })
}

/// Number records by their document order, which is their z-order.
fn stacked(mut records: Vec<WidgetRecord>) -> Vec<WidgetRecord> {
    for (z, record) in records.iter_mut().enumerate() {
        record.set_z_index(z);
    }
    records
}

fn settings_of(doc: &LayoutDocument) -> ZoneSettings {
    ZoneSettings {
        grid_size: doc.grid_size,
        grid_visible: doc.grid_visible,
        layout_mode: doc.layout_mode,
    }
}

/// Validate a raw tree and convert it to a document.
pub fn from_value(value: Value) -> LayoutResult<LayoutDocument> {
    check(&value)?;
    Ok(serde_json::from_value(value)?)
}

pub fn to_json_string(doc: &LayoutDocument) -> LayoutResult<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

pub fn from_json_str(s: &str) -> LayoutResult<LayoutDocument> {
    from_value(serde_json::from_str(s)?)
}

pub fn to_yaml_string(doc: &LayoutDocument) -> LayoutResult<String> {
    Ok(serde_yaml::to_string(doc)?)
}

pub fn from_yaml_str(s: &str) -> LayoutResult<LayoutDocument> {
    from_value(serde_yaml::from_str(s)?)
}

/// Combine two documents.
///
/// Entries of `a` whose id also appears in `b` are dropped; the result holds
/// the remaining entries of `a` followed by every entry of `b`. Settings come
/// from `a`.
pub fn merge_layouts(a: &LayoutDocument, b: &LayoutDocument) -> LayoutDocument {
    let overridden: HashSet<&WidgetId> = b.widgets.iter().map(|e| &e.id).collect();
    let widgets: Vec<WidgetEntry> = a
        .widgets
        .iter()
        .filter(|e| !overridden.contains(&e.id))
        .chain(b.widgets.iter())
        .cloned()
        .collect();

    let provenance = |doc: &LayoutDocument| doc.created_at().unwrap_or("unknown").to_string();
    LayoutDocument {
        version: FORMAT_VERSION.to_string(),
        grid_size: a.grid_size,
        grid_visible: a.grid_visible,
        layout_mode: a.layout_mode,
        widgets,
        metadata: Some(DocumentMetadata {
            created_at: None,
            library: Some(LIBRARY_NAME.to_string()),
            merged_from: vec![provenance(a), provenance(b)],
        }),
    }
}

/// Axis-aligned bounds of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutBounds {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
    pub width: i64,
    pub height: i64,
}

impl From<Rect> for LayoutBounds {
    fn from(rect: Rect) -> Self {
        Self {
            min_x: rect.x,
            min_y: rect.y,
            max_x: rect.right(),
            max_y: rect.bottom(),
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Summary numbers for a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutStatistics {
    pub total_widgets: usize,
    /// Widget count per kind, sorted by kind.
    pub widget_kinds: BTreeMap<String, usize>,
    /// `None` for an empty layout.
    pub bounds: Option<LayoutBounds>,
    pub layout_mode: LayoutMode,
    pub grid_size: u32,
}

pub fn statistics(doc: &LayoutDocument) -> LayoutStatistics {
    let mut widget_kinds = BTreeMap::new();
    for entry in &doc.widgets {
        *widget_kinds.entry(entry.kind.clone()).or_insert(0) += 1;
    }
    let records: Vec<WidgetRecord> = doc.widgets.iter().map(WidgetEntry::to_record).collect();
    LayoutStatistics {
        total_widgets: doc.widgets.len(),
        widget_kinds,
        bounds: bounding_rect(&records).map(LayoutBounds::from),
        layout_mode: doc.layout_mode,
        grid_size: doc.grid_size,
    }
}

// --- File IO ---

/// Encoding chosen from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// `.json`, `.yaml` or `.yml`, case-insensitively.
    pub fn from_path(path: &Path) -> LayoutResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(LayoutError::invalid(format!(
                "cannot tell layout format of {}",
                path.display()
            ))),
        }
    }
}

/// Copy of `doc` with a fresh provenance stamp.
fn stamped(doc: &LayoutDocument) -> LayoutDocument {
    let mut doc = doc.clone();
    let metadata = doc.metadata.get_or_insert_with(DocumentMetadata::default);
    metadata.created_at = Some(Utc::now().to_rfc3339());
    metadata.library = Some(LIBRARY_NAME.to_string());
    doc
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> LayoutError {
    LayoutError::Io(format!("{}: {}", path.display(), e))
}

/// Write `contents` next to `path` and rename it into place, so readers never
/// see a partial file.
fn write_atomic(path: &Path, contents: &[u8]) -> LayoutResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| io_error(path, e))?;
    file.write_all(contents).map_err(|e| io_error(path, e))?;
    file.as_file().sync_all().map_err(|e| io_error(path, e))?;
    file.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}

fn read(path: &Path) -> LayoutResult<String> {
    std::fs::read_to_string(path).map_err(|e| io_error(path, e))
}

pub fn save_json(doc: &LayoutDocument, path: impl AsRef<Path>) -> LayoutResult<()> {
    let path = path.as_ref();
    write_atomic(path, to_json_string(&stamped(doc))?.as_bytes())?;
    log::info!("Saved layout ({} widget(s)) to {}", doc.widgets.len(), path.display());
    Ok(())
}

pub fn load_json(path: impl AsRef<Path>) -> LayoutResult<LayoutDocument> {
    let path = path.as_ref();
    let doc = from_json_str(&read(path)?)?;
    log::info!("Loaded layout ({} widget(s)) from {}", doc.widgets.len(), path.display());
    Ok(doc)
}

pub fn save_yaml(doc: &LayoutDocument, path: impl AsRef<Path>) -> LayoutResult<()> {
    let path = path.as_ref();
    write_atomic(path, to_yaml_string(&stamped(doc))?.as_bytes())?;
    log::info!("Saved layout ({} widget(s)) to {}", doc.widgets.len(), path.display());
    Ok(())
}

pub fn load_yaml(path: impl AsRef<Path>) -> LayoutResult<LayoutDocument> {
    let path = path.as_ref();
    let doc = from_yaml_str(&read(path)?)?;
    log::info!("Loaded layout ({} widget(s)) from {}", doc.widgets.len(), path.display());
    Ok(doc)
}

/// Save in the format named by the file extension.
pub fn save(doc: &LayoutDocument, path: impl AsRef<Path>) -> LayoutResult<()> {
    let path = path.as_ref();
    match Format::from_path(path)? {
        Format::Json => save_json(doc, path),
        Format::Yaml => save_yaml(doc, path),
    }
}

/// Load in the format named by the file extension.
pub fn load(path: impl AsRef<Path>) -> LayoutResult<LayoutDocument> {
    let path = path.as_ref();
    match Format::from_path(path)? {
        Format::Json => load_json(path),
        Format::Yaml => load_yaml(path),
    }
}

/// Write a timestamped JSON copy of `doc` into `dir`, creating it if needed.
///
/// Old backups are left alone. Returns the backup path.
pub fn create_backup(doc: &LayoutDocument, dir: impl AsRef<Path>) -> LayoutResult<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    let name = format!("layout_backup_{}.json", Utc::now().format("%Y%m%d_%H%M%S_%3f"));
    let path = dir.join(name);
    save_json(doc, &path)?;
    log::info!("Created layout backup {}", path.display());
    Ok(path)
}

/// Save a zone's current layout and announce it on the zone's bus.
pub fn save_zone(zone: &DropZone, path: impl AsRef<Path>) -> LayoutResult<()> {
    let path = path.as_ref();
    save(&encode(&zone.snapshot()), path)?;
    zone.bus().emit(
        types::LAYOUT_SAVED,
        None,
        crate::events::payload(json!({ "path": path.display().to_string(), "count": zone.len() })),
    );
    Ok(())
}

/// Replace a zone's contents with a saved layout.
///
/// The zone is untouched if loading or validation fails.
pub fn load_zone(zone: &mut DropZone, path: impl AsRef<Path>) -> LayoutResult<()> {
    let doc = load(path)?;
    zone.restore(decode(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{Position, Size, SnapSettings};

    fn entry(id: &str, x: i32, y: i32) -> WidgetEntry {
        WidgetEntry::from_record(
            &WidgetRecord::with_id(WidgetId::new(id), "button", Size::new(100, 35))
                .at(Position::new(x, y)),
        )
    }

    fn sample_zone() -> DropZone {
        let mut zone = DropZone::default();
        zone.add(
            WidgetRecord::new("button", Size::new(100, 35)).with_meta("text", "Save"),
            Some(Position::new(10, 20)),
        )
        .unwrap();
        zone.add(
            WidgetRecord::new("label", Size::new(80, 30))
                .with_snap(SnapSettings::grid(25))
                .with_meta("style", json!({ "color": "#333333", "sizes": [12, 14] })),
            Some(Position::new(-5, 300)),
        )
        .unwrap();
        zone.add(WidgetRecord::new("image", Size::new(150, 100)), None).unwrap();
        zone.set_layout_mode(LayoutMode::Flow);
        zone
    }

    #[test]
    fn test_round_trip_preserves_zone() {
        let zone = sample_zone();
        let snapshot = zone.snapshot();
        let decoded = decode(&encode(&snapshot)).unwrap();
        let z_order: Vec<usize> = decoded.records.iter().map(WidgetRecord::z_index).collect();
        assert_eq!(z_order, vec![0, 1, 2]);
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_round_trip_through_json_and_yaml() {
        let doc = encode(&sample_zone().snapshot());
        assert_eq!(from_json_str(&to_json_string(&doc).unwrap()).unwrap(), doc);
        assert_eq!(from_yaml_str(&to_yaml_string(&doc).unwrap()).unwrap(), doc);
    }

    #[test]
    fn test_encode_has_no_timestamp() {
        let doc = encode(&sample_zone().snapshot());
        assert!(doc.metadata.is_none());
        assert_eq!(doc.version, FORMAT_VERSION);
    }

    #[test]
    fn test_merge_later_document_wins() {
        let a = LayoutDocument {
            widgets: vec![entry("w1", 0, 0)],
            ..LayoutDocument::default()
        };
        let b = LayoutDocument {
            widgets: vec![entry("w1", 10, 10), entry("w2", 5, 5)],
            ..LayoutDocument::default()
        };
        let merged = merge_layouts(&a, &b);
        assert_eq!(merged.widgets.len(), 2);
        assert_eq!(merged.entry(&WidgetId::new("w1")).unwrap().position, Position::new(10, 10));
        assert_eq!(merged.entry(&WidgetId::new("w2")).unwrap().position, Position::new(5, 5));
        assert_eq!(
            merged.metadata.unwrap().merged_from,
            vec!["unknown".to_string(), "unknown".to_string()]
        );
    }

    #[test]
    fn test_merge_keeps_order() {
        let a = LayoutDocument {
            widgets: vec![entry("a1", 0, 0), entry("shared", 0, 0), entry("a2", 0, 0)],
            ..LayoutDocument::default()
        };
        let b = LayoutDocument {
            widgets: vec![entry("b1", 0, 0), entry("shared", 1, 1)],
            ..LayoutDocument::default()
        };
        let ids: Vec<_> = merge_layouts(&a, &b).widgets.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b1", "shared"]);
    }

    #[test]
    fn test_statistics() {
        let doc = encode(&sample_zone().snapshot());
        let stats = statistics(&doc);
        assert_eq!(stats.total_widgets, 3);
        assert_eq!(stats.widget_kinds["button"], 1);
        assert_eq!(stats.widget_kinds.len(), 3);
        assert_eq!(stats.layout_mode, LayoutMode::Flow);
        let bounds = stats.bounds.unwrap();
        assert_eq!((bounds.min_x, bounds.min_y), (-5, 20));
        assert_eq!(bounds.max_y, 330);

        assert!(statistics(&LayoutDocument::default()).bounds.is_none());
    }

    #[test]
    fn test_decode_with_registry_drops_unknown_kinds() {
        let mut zone = sample_zone();
        zone.add(WidgetRecord::new("gauge", Size::new(10, 10)), None).unwrap();
        let doc = encode(&zone.snapshot());
        let registry = WidgetRegistry::with_builtins();

        let snapshot = decode_with_registry(&doc, &registry).unwrap();
        assert_eq!(snapshot.records.len(), 3);
        let z_order: Vec<usize> = snapshot.records.iter().map(WidgetRecord::z_index).collect();
        assert_eq!(z_order, vec![0, 1, 2]);
        let button = snapshot.records.iter().find(|r| r.kind == "button").unwrap();
        assert_eq!(button.metadata["text"], "Save");
        assert_eq!(button.metadata["button_style"], "primary");
    }

    #[test]
    fn test_decode_rejects_duplicates_and_versions() {
        let mut doc = LayoutDocument {
            widgets: vec![entry("w1", 0, 0), entry("w1", 1, 1)],
            ..LayoutDocument::default()
        };
        assert!(matches!(decode(&doc), Err(LayoutError::ValidationFailed(_))));
        doc.widgets.pop();
        doc.version = "2.0".to_string();
        assert!(matches!(decode(&doc), Err(LayoutError::UnsupportedFormatVersion(_))));
    }

    #[test]
    fn test_save_and_load_files() {
        let dir = tempfile::tempdir().unwrap();
        let doc = encode(&sample_zone().snapshot());

        for name in ["layout.json", "layout.yaml", "layout.yml"] {
            let path = dir.path().join(name);
            save(&doc, &path).unwrap();
            let loaded = load(&path).unwrap();
            assert_eq!(loaded.widgets, doc.widgets);
            assert!(loaded.created_at().is_some());
        }
        assert!(matches!(
            save(&doc, dir.path().join("layout.txt")),
            Err(LayoutError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_load_reports_problems() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_json(dir.path().join("missing.json")), Err(LayoutError::Io(_))));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"version": "1.0.0", "widgets": [{"kind": "button"}]}"#).unwrap();
        let err = load_json(&bad).unwrap_err();
        assert!(err
            .issues()
            .iter()
            .any(|i| i.to_string() == "widgets[0].id: missing required field"));

        let garbage = dir.path().join("garbage.yaml");
        std::fs::write(&garbage, "widgets: [unclosed").unwrap();
        assert!(matches!(load_yaml(&garbage), Err(LayoutError::Serialization(_))));
    }

    #[test]
    fn test_create_backup() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        let doc = encode(&sample_zone().snapshot());
        let path = create_backup(&doc, &backups).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("layout_backup_"));
        assert!(name.ends_with(".json"));
        assert_eq!(load_json(&path).unwrap().widgets, doc.widgets);
    }

    #[test]
    fn test_save_and_load_zone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zone.json");
        let zone = sample_zone();
        save_zone(&zone, &path).unwrap();
        assert_eq!(zone.bus().history(Some(types::LAYOUT_SAVED), None).len(), 1);

        let mut restored = DropZone::default();
        load_zone(&mut restored, &path).unwrap();
        assert_eq!(restored.snapshot(), zone.snapshot());
        assert_eq!(restored.bus().history(Some(types::LAYOUT_LOADED), None).len(), 1);

        // A failed load leaves the zone as it was.
        std::fs::write(&path, "{}").unwrap();
        assert!(load_zone(&mut restored, &path).is_err());
        assert_eq!(restored.len(), 3);
    }
}
