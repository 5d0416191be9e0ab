//! Named layout persistence.
//!
//! A [`Storage`] keeps layout documents under short names such as
//! `"dashboard"` or `"autosave"`, independent of where they end up on disk.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::LayoutError;
use crate::serializer::LayoutDocument;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Layout not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend holding layout documents by name.
pub trait Storage: Send + Sync {
    /// Save a layout, replacing any previous one with the same name.
    fn save(&self, name: &str, document: &LayoutDocument) -> StorageResult<()>;

    /// Load a layout.
    fn load(&self, name: &str) -> StorageResult<LayoutDocument>;

    /// Delete a layout. Deleting a missing name is not an error.
    fn delete(&self, name: &str) -> StorageResult<()>;

    /// List all layout names.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a layout exists.
    fn exists(&self, name: &str) -> StorageResult<bool>;
}
