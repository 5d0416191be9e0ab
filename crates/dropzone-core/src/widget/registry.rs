//! Registry resolving widget kind names to their defaults.
//!
//! The core never interprets `kind` itself; hosts register the kinds they can
//! render and use the registry to create records and to filter decoded layouts.

use super::record::{Metadata, Size, WidgetRecord};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Description of a registered widget kind.
#[derive(Debug, Clone, PartialEq)]
pub struct KindInfo {
    pub description: String,
    pub category: String,
    /// Size given to newly created records.
    pub default_size: Size,
    /// Metadata keys every record of this kind starts with.
    pub default_metadata: Metadata,
}

impl KindInfo {
    pub fn new(
        description: impl Into<String>,
        category: impl Into<String>,
        default_size: Size,
    ) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
            default_size,
            default_metadata: Metadata::new(),
        }
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_metadata.insert(key.into(), value.into());
        self
    }
}

/// Kind name to [`KindInfo`] mapping.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    kinds: BTreeMap<String, KindInfo>,
}

impl WidgetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in button, label and image kinds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            "button",
            KindInfo::new("Interactive button with click events", "Input", Size::new(100, 35))
                .with_default("text", "Button")
                .with_default("button_style", "primary")
                .with_default("enabled", true)
                .with_default("checkable", false),
        );
        registry.register(
            "label",
            KindInfo::new("Text display with formatting options", "Display", Size::new(80, 30))
                .with_default("text", "Label")
                .with_default("font_size", 14)
                .with_default("color", "#333333")
                .with_default("alignment", "center")
                .with_default("word_wrap", false),
        );
        registry.register(
            "image",
            KindInfo::new("Image display with scaling", "Media", Size::new(150, 100))
                .with_default("image_path", Value::Null)
                .with_default("scale_mode", "keep_aspect_ratio")
                .with_default("aspect_ratio_locked", true),
        );
        registry
    }

    /// Register (or replace) a kind.
    pub fn register(&mut self, kind: impl Into<String>, info: KindInfo) {
        let kind = kind.into();
        log::debug!("Registered widget kind '{}'", kind);
        self.kinds.insert(kind, info);
    }

    /// Remove a kind. Returns its info if it was registered.
    pub fn unregister(&mut self, kind: &str) -> Option<KindInfo> {
        self.kinds.remove(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    pub fn info(&self, kind: &str) -> Option<&KindInfo> {
        self.kinds.get(kind)
    }

    /// Registered kind names in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Create a fresh record of the given kind with its defaults.
    pub fn create(&self, kind: &str) -> Option<WidgetRecord> {
        let info = self.kinds.get(kind)?;
        let record = WidgetRecord::new(kind, info.default_size);
        Some(record.with_metadata(info.default_metadata.clone()))
    }

    /// Fill in default metadata keys the record does not set yet.
    ///
    /// Returns false if the record's kind is not registered.
    pub fn apply_defaults(&self, record: &mut WidgetRecord) -> bool {
        let Some(info) = self.kinds.get(&record.kind) else {
            return false;
        };
        for (key, value) in &info.default_metadata {
            record.metadata.entry(key.clone()).or_insert_with(|| value.clone());
        }
        true
    }

    /// Summary of every kind, for host palettes.
    pub fn describe(&self) -> Value {
        let kinds: serde_json::Map<String, Value> = self
            .kinds
            .iter()
            .map(|(name, info)| {
                (
                    name.clone(),
                    json!({
                        "description": info.description,
                        "category": info.category,
                        "default_size": [info.default_size.width, info.default_size.height],
                    }),
                )
            })
            .collect();
        Value::Object(kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = WidgetRegistry::with_builtins();
        let kinds: Vec<_> = registry.kinds().collect();
        assert_eq!(kinds, vec!["button", "image", "label"]);
    }

    #[test]
    fn test_create_uses_defaults() {
        let registry = WidgetRegistry::with_builtins();
        let button = registry.create("button").unwrap();
        assert_eq!(button.kind, "button");
        assert_eq!(button.size, Size::new(100, 35));
        assert_eq!(button.metadata["text"], "Button");
    }

    #[test]
    fn test_create_unknown_kind() {
        let registry = WidgetRegistry::with_builtins();
        assert!(registry.create("slider").is_none());
    }

    #[test]
    fn test_custom_kind_roundtrip() {
        let mut registry = WidgetRegistry::new();
        registry.register(
            "slider",
            KindInfo::new("Horizontal slider", "Input", Size::new(200, 30))
                .with_default("value", 50),
        );
        assert!(registry.contains("slider"));
        assert_eq!(registry.create("slider").unwrap().metadata["value"], 50);
        assert!(registry.unregister("slider").is_some());
        assert!(!registry.contains("slider"));
    }

    #[test]
    fn test_apply_defaults_keeps_existing_keys() {
        let registry = WidgetRegistry::with_builtins();
        let mut label = WidgetRecord::new("label", Size::new(80, 30)).with_meta("text", "Hello");
        assert!(registry.apply_defaults(&mut label));
        assert_eq!(label.metadata["text"], "Hello");
        assert_eq!(label.metadata["font_size"], 14);

        let mut unknown = WidgetRecord::new("gauge", Size::new(10, 10));
        assert!(!registry.apply_defaults(&mut unknown));
    }

    #[test]
    fn test_describe() {
        let registry = WidgetRegistry::with_builtins();
        let description = registry.describe();
        assert_eq!(description["image"]["category"], "Media");
        assert_eq!(description["label"]["default_size"][0], 80);
    }
}
