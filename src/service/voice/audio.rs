//! Audio resource construction.
//!
//! An [`AudioResource`] is a media file paired with the volume it should be played at. The
//! builder checks the file up front so a missing clip is reported before any voice
//! connection is used for it.

use std::path::{Path, PathBuf};

use crate::error::transport::TransportError;

/// A media file ready to hand to the voice transport.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioResource {
    path: PathBuf,
    volume: f32,
}

impl AudioResource {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Playback volume, where 1.0 is the file's own level.
    pub fn volume(&self) -> f32 {
        self.volume
    }
}

/// Builds [`AudioResource`]s at a fixed volume.
#[derive(Debug, Clone, Copy)]
pub struct AudioResourceBuilder {
    volume: f32,
}

impl AudioResourceBuilder {
    pub fn new(volume: f32) -> Self {
        Self { volume }
    }

    /// Wraps the file at `path` into a resource.
    ///
    /// # Returns
    /// - `Ok(AudioResource)` - File exists and is a regular file
    /// - `Err(TransportError::Resource)` - File is missing, unreadable or not a file
    pub async fn build(&self, path: &Path) -> Result<AudioResource, TransportError> {
        let resource_error = |reason: String| TransportError::Resource {
            path: path.display().to_string(),
            reason,
        };

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| resource_error(e.to_string()))?;

        if !metadata.is_file() {
            return Err(resource_error("not a regular file".to_string()));
        }

        Ok(AudioResource {
            path: path.to_path_buf(),
            volume: self.volume,
        })
    }
}
