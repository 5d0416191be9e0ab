//! Export a layout as a Rust program that rebuilds it through the zone API.

use super::document::{LayoutDocument, WidgetEntry};
use crate::widget::{SnapSettings, WidgetFlags};
use crate::zone::LayoutMode;
use std::fmt::Write;

/// Generate source code reconstructing `doc` widget by widget.
///
/// The output is deterministic: no timestamps, entries in document order.
pub fn export_as_code(doc: &LayoutDocument) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_program(&mut out, doc);
    out
}

fn write_program(out: &mut String, doc: &LayoutDocument) -> std::fmt::Result {
    writeln!(
        out,
        "//! Generated from a {} layout document (format {}).",
        super::LIBRARY_NAME,
        doc.version
    )?;
    writeln!(out)?;
    writeln!(out, "use dropzone_core::{{")?;
    writeln!(
        out,
        "    DropZone, DropZoneConfig, LayoutError, LayoutMode, Position, Size, SnapSettings,"
    )?;
    writeln!(out, "    WidgetFlags, WidgetId, WidgetRecord,")?;
    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(out, "fn main() -> Result<(), LayoutError> {{")?;
    writeln!(out, "    let mut zone = DropZone::new(DropZoneConfig::default());")?;
    writeln!(out, "    zone.set_layout_mode(LayoutMode::{});", mode_variant(doc.layout_mode))?;
    writeln!(out, "    zone.set_grid_size({})?;", doc.grid_size)?;
    writeln!(out, "    zone.set_grid_visible({});", doc.grid_visible)?;

    for (n, entry) in doc.widgets.iter().enumerate() {
        writeln!(out)?;
        write_entry(out, n + 1, entry)?;
    }

    writeln!(out)?;
    writeln!(out, "    println!(\"Rebuilt {{}} widget(s)\", zone.len());")?;
    writeln!(out, "    Ok(())")?;
    writeln!(out, "}}")
}

fn write_entry(out: &mut String, n: usize, entry: &WidgetEntry) -> std::fmt::Result {
    let mut chain = vec![format!(
        "    let widget_{} = WidgetRecord::with_id(WidgetId::new({:?}), {:?}, Size::new({}, {}))",
        n,
        entry.id.as_str(),
        entry.kind,
        entry.size.width,
        entry.size.height
    )];
    if entry.flags != WidgetFlags::default() {
        chain.push(format!(
            "        .with_flags(WidgetFlags {{ draggable: {}, resizable: {}, deletable: {} }})",
            entry.flags.draggable, entry.flags.resizable, entry.flags.deletable
        ));
    }
    if let Some(snap) = entry.snap.filter(|s| *s != SnapSettings::default()) {
        chain.push(format!(
            "        .with_snap(SnapSettings {{ enabled: {}, grid_size: {} }})",
            snap.enabled, snap.grid_size
        ));
    }
    for (key, value) in &entry.metadata {
        chain.push(format!("        .with_meta({:?}, serde_json::json!({}))", key, value));
    }

    writeln!(out, "    // Widget {}: {}", n, entry.kind)?;
    writeln!(out, "{};", chain.join("\n"))?;
    writeln!(
        out,
        "    zone.add(widget_{}, Some(Position::new({}, {})))?;",
        n, entry.position.x, entry.position.y
    )
}

fn mode_variant(mode: LayoutMode) -> &'static str {
    match mode {
        LayoutMode::Free => "Free",
        LayoutMode::Grid => "Grid",
        LayoutMode::Flow => "Flow",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{Position, Size, WidgetRecord};

    fn sample() -> LayoutDocument {
        let button = WidgetRecord::with_id("ok".into(), "button", Size::new(100, 35))
            .at(Position::new(10, 20))
            .with_meta("text", "OK \"now\"");
        let mut label = WidgetRecord::with_id("title".into(), "label", Size::new(80, 30))
            .at(Position::new(0, 0));
        label.flags.draggable = false;
        LayoutDocument {
            layout_mode: LayoutMode::Grid,
            widgets: vec![WidgetEntry::from_record(&button), WidgetEntry::from_record(&label)],
            ..LayoutDocument::default()
        }
    }

    #[test]
    fn test_export_contains_every_widget() {
        let code = export_as_code(&sample());
        assert!(code.contains("zone.set_layout_mode(LayoutMode::Grid);"));
        assert!(code.contains("WidgetId::new(\"ok\"), \"button\", Size::new(100, 35)"));
        assert!(code.contains("zone.add(widget_1, Some(Position::new(10, 20)))?;"));
        assert!(code.contains("zone.add(widget_2, Some(Position::new(0, 0)))?;"));
        assert!(code.contains("draggable: false"));
        // Metadata is embedded as JSON, quotes escaped.
        assert!(code.contains(r#".with_meta("text", serde_json::json!("OK \"now\""))"#));
    }

    #[test]
    fn test_export_is_deterministic() {
        assert_eq!(export_as_code(&sample()), export_as_code(&sample()));
    }
}
