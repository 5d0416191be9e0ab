//! Structural validation of layout documents before decoding.
//!
//! Validation runs on the untyped tree (JSON, or YAML parsed into the same
//! shape) so that every problem can be reported at once with the entry index
//! and field it concerns, rather than stopping at the first decode error.

use super::document::{LayoutDocument, SUPPORTED_VERSIONS};
use crate::error::{LayoutError, LayoutResult, ValidationIssue};
use serde_json::{Map, Value};
use std::collections::HashSet;

const MISSING: &str = "missing required field";

/// Collect every problem with a raw document. An empty list means valid.
pub fn validate(value: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let Some(doc) = value.as_object() else {
        issues.push(ValidationIssue::document("document", "expected a mapping"));
        return issues;
    };

    match doc.get("version") {
        None => issues.push(ValidationIssue::document("version", MISSING)),
        Some(Value::String(v)) if SUPPORTED_VERSIONS.contains(&v.as_str()) => {}
        Some(Value::String(v)) => issues.push(unsupported(v)),
        Some(_) => issues.push(ValidationIssue::document("version", "expected a string")),
    }

    if let Some(grid) = doc.get("grid_size") {
        if !grid.as_u64().is_some_and(|g| g > 0 && g <= u32::MAX as u64) {
            issues.push(ValidationIssue::document("grid_size", "expected a positive integer"));
        }
    }
    if let Some(visible) = doc.get("grid_visible") {
        if !visible.is_boolean() {
            issues.push(ValidationIssue::document("grid_visible", "expected a boolean"));
        }
    }
    if let Some(mode) = doc.get("layout_mode") {
        if !matches!(mode.as_str(), Some("free" | "grid" | "flow")) {
            issues.push(ValidationIssue::document(
                "layout_mode",
                "expected one of free, grid, flow",
            ));
        }
    }

    match doc.get("widgets") {
        None => issues.push(ValidationIssue::document("widgets", MISSING)),
        Some(Value::Array(entries)) => validate_entries(entries, &mut issues),
        Some(_) => issues.push(ValidationIssue::document("widgets", "expected a list")),
    }
    issues
}

fn unsupported(version: &str) -> ValidationIssue {
    ValidationIssue::document("version", format!("unsupported version \"{}\"", version))
}

fn validate_entries(entries: &[Value], issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        let Some(entry) = entry.as_object() else {
            issues.push(ValidationIssue::entry(index, None, "expected a mapping"));
            continue;
        };

        match entry.get("id") {
            None => issues.push(ValidationIssue::entry(index, Some("id"), MISSING)),
            Some(Value::String(id)) => {
                if !seen.insert(id.as_str()) {
                    let reason = format!("duplicate id \"{}\"", id);
                    issues.push(ValidationIssue::entry(index, Some("id"), reason));
                }
            }
            Some(_) => {
                issues.push(ValidationIssue::entry(index, Some("id"), "expected a string"))
            }
        }

        match entry.get("kind").or_else(|| entry.get("type")) {
            None => issues.push(ValidationIssue::entry(index, Some("kind"), MISSING)),
            Some(Value::String(_)) => {}
            Some(_) => {
                issues.push(ValidationIssue::entry(index, Some("kind"), "expected a string"))
            }
        }

        check_pair(entry, index, "position", ["x", "y"], false, issues);
        check_pair(entry, index, "size", ["width", "height"], true, issues);

        if let Some(metadata) = entry.get("metadata") {
            if !metadata.is_object() {
                issues.push(ValidationIssue::entry(index, Some("metadata"), "expected a mapping"));
            }
        }
    }
}

/// Check a `{a: int, b: int}` sub-mapping such as position or size.
fn check_pair(
    entry: &Map<String, Value>,
    index: usize,
    field: &str,
    keys: [&str; 2],
    unsigned: bool,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(value) = entry.get(field) else {
        issues.push(ValidationIssue::entry(index, Some(field), MISSING));
        return;
    };
    let Some(pair) = value.as_object() else {
        issues.push(ValidationIssue::entry(index, Some(field), "expected a mapping"));
        return;
    };
    for key in keys {
        let path = format!("{}.{}", field, key);
        let reason = match pair.get(key) {
            None => Some(MISSING),
            Some(v) if !v.is_number() => Some("expected a number"),
            Some(v) if unsigned => (!v.as_u64().is_some_and(|n| n <= u32::MAX as u64))
                .then_some("expected a non-negative integer"),
            Some(v) => (!v.as_i64().is_some_and(|n| i32::try_from(n).is_ok()))
                .then_some("expected an integer"),
        };
        if let Some(reason) = reason {
            issues.push(ValidationIssue::entry(index, Some(&path), reason));
        }
    }
}

/// Validate a raw document, mapping problems to the right error.
///
/// An unrecognized version wins over every other issue.
pub fn check(value: &Value) -> LayoutResult<()> {
    if let Some(Value::String(version)) = value.get("version") {
        if !SUPPORTED_VERSIONS.contains(&version.as_str()) {
            return Err(LayoutError::UnsupportedFormatVersion(version.clone()));
        }
    }
    let issues = validate(value);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(LayoutError::ValidationFailed(issues))
    }
}

/// Check the invariants a typed document cannot express: the version tag,
/// id uniqueness and a positive grid size.
pub fn check_document(doc: &LayoutDocument) -> LayoutResult<()> {
    if !doc.is_supported_version() {
        return Err(LayoutError::UnsupportedFormatVersion(doc.version.clone()));
    }
    let mut issues = Vec::new();
    if doc.grid_size == 0 {
        issues.push(ValidationIssue::document("grid_size", "expected a positive integer"));
    }
    let mut seen = HashSet::new();
    for (index, entry) in doc.widgets.iter().enumerate() {
        if !seen.insert(&entry.id) {
            let reason = format!("duplicate id \"{}\"", entry.id);
            issues.push(ValidationIssue::entry(index, Some("id"), reason));
        }
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(LayoutError::ValidationFailed(issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: &str) -> Value {
        json!({
            "id": id,
            "kind": "button",
            "position": { "x": 0, "y": 0 },
            "size": { "width": 100, "height": 35 },
        })
    }

    fn doc(widgets: Vec<Value>) -> Value {
        json!({
            "version": "1.0.0",
            "grid_size": 20,
            "grid_visible": true,
            "layout_mode": "free",
            "widgets": widgets,
        })
    }

    #[test]
    fn test_valid_document() {
        assert!(validate(&doc(vec![entry("a"), entry("b")])).is_empty());
        assert!(check(&doc(vec![])).is_ok());
    }

    #[test]
    fn test_missing_id_reports_field_and_index() {
        let mut broken = entry("x");
        broken.as_object_mut().unwrap().remove("id");
        let issues = validate(&doc(vec![entry("a"), broken]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].entry, Some(1));
        assert_eq!(issues[0].field.as_deref(), Some("id"));
        assert_eq!(issues[0].to_string(), "widgets[1].id: missing required field");
    }

    #[test]
    fn test_duplicate_ids() {
        let issues = validate(&doc(vec![entry("a"), entry("a")]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].entry, Some(1));
        assert!(issues[0].reason.contains("duplicate"));
    }

    #[test]
    fn test_non_numeric_position() {
        let mut broken = entry("a");
        broken["position"]["x"] = json!("left");
        broken["size"]["height"] = json!(-3);
        let issues = validate(&doc(vec![broken]));
        let fields: Vec<_> = issues.iter().filter_map(|i| i.field.as_deref()).collect();
        assert_eq!(fields, vec!["position.x", "size.height"]);
    }

    #[test]
    fn test_collects_every_issue() {
        let value = json!({ "version": "1.0.0", "widgets": [{ "kind": 3 }, "nope"] });
        let issues = validate(&value);
        // id, kind, position, size on entry 0; entry 1 not a mapping
        assert_eq!(issues.len(), 5);
        assert_eq!(issues[4].to_string(), "widgets[1]: expected a mapping");
    }

    #[test]
    fn test_version_checks() {
        let mut value = doc(vec![]);
        value["version"] = json!("9.0");
        assert!(matches!(
            check(&value),
            Err(LayoutError::UnsupportedFormatVersion(v)) if v == "9.0"
        ));
        assert!(!validate(&value).is_empty());

        value.as_object_mut().unwrap().remove("version");
        assert!(matches!(check(&value), Err(LayoutError::ValidationFailed(_))));
    }

    #[test]
    fn test_settings_checks() {
        let mut value = doc(vec![]);
        value["grid_size"] = json!(0);
        value["layout_mode"] = json!("stack");
        assert_eq!(validate(&value).len(), 2);
    }

    #[test]
    fn test_check_document_duplicates() {
        let mut document: LayoutDocument = serde_json::from_value(doc(vec![entry("a")])).unwrap();
        assert!(check_document(&document).is_ok());
        document.widgets.push(document.widgets[0].clone());
        assert!(matches!(check_document(&document), Err(LayoutError::ValidationFailed(_))));
        document.version = "0.1".to_string();
        assert!(matches!(check_document(&document), Err(LayoutError::UnsupportedFormatVersion(_))));
    }
}
