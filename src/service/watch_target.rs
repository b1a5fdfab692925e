//! Watch-target registry.
//!
//! Tracks which members trigger a voice alert: one runtime-settable default identifier plus
//! a fixed set of special identifiers configured at startup, each with a dedicated clip.
//! The default identifier is persisted through [`WatchTargetStore`] so it survives restarts.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::data::watch_target::WatchTargetStore;
use crate::error::watch::WatchError;

/// Audio clip selection for watched members.
#[derive(Debug, Clone)]
pub struct AlertClips {
    /// Clip played for the default watched member.
    pub default: PathBuf,
    /// Dedicated clips keyed by identifier. Fixed for the lifetime of the process.
    pub special: HashMap<String, PathBuf>,
}

/// Who may change the default identifier, and where.
#[derive(Debug, Clone)]
pub struct CommandPolicy {
    /// Discord user ids allowed to run `/setid`.
    pub admin_ids: HashSet<u64>,
    /// The only channel `/setid` is accepted in.
    pub command_channel_id: u64,
}

/// Registry of watched identifiers.
///
/// Shared between the alert event loop (reads) and the `/setid` command handler (writes),
/// so the default identifier sits behind an async lock.
pub struct WatchTargetRegistry {
    default_identifier: RwLock<Option<String>>,
    clips: AlertClips,
    policy: CommandPolicy,
    store: WatchTargetStore,
}

impl WatchTargetRegistry {
    /// Creates the registry, loading the persisted default identifier from `store`.
    ///
    /// # Returns
    /// - `Ok(WatchTargetRegistry)` - Registry with the stored default, if any
    /// - `Err(io::Error)` - The identifier file exists but could not be read
    pub async fn load(
        store: WatchTargetStore,
        policy: CommandPolicy,
        clips: AlertClips,
    ) -> Result<Self, std::io::Error> {
        let default_identifier = store.load().await?;

        match &default_identifier {
            Some(id) => tracing::info!("Loaded watched identifier from file: {}", id),
            None => tracing::info!(
                "No watched identifier stored at {}",
                store.path().display()
            ),
        }

        Ok(Self {
            default_identifier: RwLock::new(default_identifier),
            clips,
            policy,
            store,
        })
    }

    /// Returns the current default identifier. Used in tests to inspect registry state.
    #[cfg(test)]
    pub async fn default_identifier(&self) -> Option<String> {
        self.default_identifier.read().await.clone()
    }

    /// Sets and persists the default watched identifier.
    ///
    /// Checks the channel, then the caller, then the identifier format. Nothing is changed
    /// unless every check passes and the file write succeeds.
    ///
    /// # Arguments
    /// - `caller_id` - Discord user id of whoever issued the command
    /// - `channel_id` - Channel the command was issued in
    /// - `identifier` - New identifier; surrounding whitespace is ignored
    ///
    /// # Returns
    /// - `Ok(String)` - The stored (trimmed) identifier
    /// - `Err(WatchError::WrongChannel)` - Issued outside the control channel
    /// - `Err(WatchError::Unauthorized)` - Caller is not an admin
    /// - `Err(WatchError::InvalidFormat)` - Identifier is empty or not purely numeric
    /// - `Err(WatchError::Persist)` - Identifier file could not be written
    pub async fn set_default_identifier(
        &self,
        caller_id: u64,
        channel_id: u64,
        identifier: &str,
    ) -> Result<String, WatchError> {
        if channel_id != self.policy.command_channel_id {
            return Err(WatchError::WrongChannel);
        }

        if !self.policy.admin_ids.contains(&caller_id) {
            return Err(WatchError::Unauthorized);
        }

        let identifier = identifier.trim();
        if !is_valid_identifier(identifier) {
            return Err(WatchError::InvalidFormat(identifier.to_string()));
        }

        // Held across the write so the file and memory always agree on the latest value
        let mut current = self.default_identifier.write().await;

        self.store
            .save(identifier)
            .await
            .map_err(|source| WatchError::Persist {
                path: self.store.path().display().to_string(),
                source,
            })?;

        *current = Some(identifier.to_string());
        tracing::info!("Watched identifier updated: {}", identifier);

        Ok(identifier.to_string())
    }

    /// Returns whether `identifier` is the default or has a special clip.
    pub async fn is_watched(&self, identifier: &str) -> bool {
        if self.clips.special.contains_key(identifier) {
            return true;
        }

        self.default_identifier.read().await.as_deref() == Some(identifier)
    }

    /// Returns the clip to play for `identifier`.
    ///
    /// A special clip takes precedence over the default clip when both could apply.
    pub fn clip_for(&self, identifier: &str) -> &Path {
        self.clips
            .special
            .get(identifier)
            .unwrap_or(&self.clips.default)
    }
}

/// An identifier is a non-empty string of ASCII decimal digits.
pub fn is_valid_identifier(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.chars().all(|c| c.is_ascii_digit())
}
