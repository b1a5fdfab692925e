//! File-backed store for the default watched identifier.
//!
//! The store is a single plain-text file holding one identifier. It is read once at startup
//! and overwritten on every successful `/setid`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Repository for the persisted default watched identifier.
pub struct WatchTargetStore {
    path: PathBuf,
}

impl WatchTargetStore {
    /// Creates a store backed by the file at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted identifier.
    ///
    /// # Returns
    /// - `Ok(Some(id))` - File exists and holds a non-blank value (trimmed)
    /// - `Ok(None)` - File is missing or blank
    /// - `Err(io::Error)` - File exists but could not be read
    pub async fn load(&self) -> Result<Option<String>, std::io::Error> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let trimmed = contents.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Overwrites the file with `identifier`, trimmed.
    pub async fn save(&self, identifier: &str) -> Result<(), std::io::Error> {
        tokio::fs::write(&self.path, identifier.trim()).await
    }
}
