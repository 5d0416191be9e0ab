//! File-based storage: one JSON document per layout name.

use super::{Storage, StorageError, StorageResult};
use crate::error::LayoutError;
use crate::serializer::{self, LayoutDocument};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores layouts as JSON files in a directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory if
    /// it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Linux: `~/.local/share/dropzone/layouts/`
    /// On Windows: `%LOCALAPPDATA%\dropzone\layouts\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join(serializer::LIBRARY_NAME).join("layouts"))
    }

    fn layout_path(&self, name: &str) -> PathBuf {
        let safe_name: String = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_name))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, name: &str, document: &LayoutDocument) -> StorageResult<()> {
        serializer::save_json(document, self.layout_path(name)).map_err(StorageError::from)
    }

    fn load(&self, name: &str) -> StorageResult<LayoutDocument> {
        let path = self.layout_path(name);
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        serializer::load_json(&path).map_err(|e| match e {
            LayoutError::Serialization(msg) => {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), msg))
            }
            other => StorageError::from(other),
        })
    }

    fn delete(&self, name: &str) -> StorageResult<()> {
        let path = self.layout_path(name);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.layout_path(name).exists())
    }
}
