//! Local alert log file.
//!
//! Log records are text blocks separated by a blank line. Every block written by the bot
//! carries a `Date/Time:` line in [`TIMESTAMP_FORMAT`], which is what pruning keys on.
//! Blocks without a parseable timestamp are never pruned.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::notification::NotificationError;

/// Format of the timestamp written after `Date/Time:` in every log block.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p %:z";

/// Marker preceding the timestamp inside a log block.
pub const TIMESTAMP_MARKER: &str = "Date/Time:";

const BLOCK_SEPARATOR: &str = "\n\n";

/// Append-only log file with age-based pruning.
///
/// Writes are serialized through an internal lock since the event loop, the liveness route
/// and the pruning job all touch the same file.
pub struct AlertLogFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AlertLogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `block` followed by a blank line, creating the file if needed.
    pub async fn append(&self, block: &str) -> Result<(), NotificationError> {
        let _guard = self.lock.lock().await;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.file_error(e))?;

        file.write_all(format!("{block}{BLOCK_SEPARATOR}").as_bytes())
            .await
            .map_err(|e| self.file_error(e))?;

        Ok(())
    }

    /// Removes blocks whose timestamp is older than `retention` relative to `now`.
    ///
    /// # Returns
    /// - `Ok(count)` - Number of blocks removed; a missing file prunes nothing
    /// - `Err(NotificationError::LogFile)` - Reading or rewriting the file failed
    pub async fn prune(
        &self,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> Result<usize, NotificationError> {
        let _guard = self.lock.lock().await;

        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(self.file_error(e)),
        };

        let blocks: Vec<&str> = contents
            .split(BLOCK_SEPARATOR)
            .filter(|block| !block.trim().is_empty())
            .collect();

        let kept: Vec<&str> = blocks
            .iter()
            .copied()
            .filter(|block| match block_timestamp(block) {
                Some(timestamp) => now.signed_duration_since(timestamp) < retention,
                None => true,
            })
            .collect();

        let removed = blocks.len() - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        let rewritten: String = kept
            .iter()
            .map(|block| format!("{block}{BLOCK_SEPARATOR}"))
            .collect();

        tokio::fs::write(&self.path, rewritten)
            .await
            .map_err(|e| self.file_error(e))?;

        Ok(removed)
    }

    fn file_error(&self, source: std::io::Error) -> NotificationError {
        NotificationError::LogFile {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Extracts the timestamp of a log block, if it has a parseable `Date/Time:` line.
pub fn block_timestamp(block: &str) -> Option<DateTime<FixedOffset>> {
    block.lines().find_map(|line| {
        let (_, raw) = line.split_once(TIMESTAMP_MARKER)?;
        DateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).ok()
    })
}
