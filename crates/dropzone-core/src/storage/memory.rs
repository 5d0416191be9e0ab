//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use crate::serializer::LayoutDocument;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    layouts: RwLock<HashMap<String, LayoutDocument>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, name: &str, document: &LayoutDocument) -> StorageResult<()> {
        let mut layouts = self.layouts.write().map_err(lock_error)?;
        layouts.insert(name.to_string(), document.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> StorageResult<LayoutDocument> {
        let layouts = self.layouts.read().map_err(lock_error)?;
        layouts
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn delete(&self, name: &str) -> StorageResult<()> {
        let mut layouts = self.layouts.write().map_err(lock_error)?;
        layouts.remove(name);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let layouts = self.layouts.read().map_err(lock_error)?;
        let mut names: Vec<String> = layouts.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        let layouts = self.layouts.read().map_err(lock_error)?;
        Ok(layouts.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::WidgetEntry;
    use crate::widget::{Size, WidgetRecord};

    fn sample() -> LayoutDocument {
        LayoutDocument {
            widgets: vec![WidgetEntry::from_record(&WidgetRecord::new(
                "button",
                Size::new(100, 35),
            ))],
            ..LayoutDocument::default()
        }
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let doc = sample();

        storage.save("test", &doc).unwrap();
        assert_eq!(storage.load("test").unwrap(), doc);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        assert!(matches!(storage.load("nonexistent"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        assert!(!storage.exists("test").unwrap());
        storage.save("test", &sample()).unwrap();
        assert!(storage.exists("test").unwrap());

        storage.delete("test").unwrap();
        assert!(!storage.exists("test").unwrap());
        storage.delete("test").unwrap();
    }

    #[test]
    fn test_list_sorted() {
        let storage = MemoryStorage::new();
        storage.save("b", &sample()).unwrap();
        storage.save("a", &sample()).unwrap();
        assert_eq!(storage.list().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
