use thiserror::Error;

/// Voice connection and playback failures.
///
/// Caught at the playback session manager; they are logged and the session is forced empty,
/// they never propagate further.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Joining the voice channel failed.
    #[error("Failed to join voice channel {channel_id} in guild {guild_id}: {reason}")]
    Join {
        guild_id: u64,
        channel_id: u64,
        reason: String,
    },

    /// Leaving the voice channel failed for a reason other than there being no call.
    #[error("Failed to leave voice in guild {guild_id}: {reason}")]
    Leave { guild_id: u64, reason: String },

    /// The voice driver has no call for the guild the player was requested for.
    #[error("No active voice connection in guild {0}")]
    NotConnected(u64),

    /// The audio file could not be turned into a playable resource.
    #[error("Failed to build audio resource from {path}: {reason}")]
    Resource { path: String, reason: String },

    /// The player rejected the track.
    #[error("Failed to start playback: {0}")]
    Play(String),
}
