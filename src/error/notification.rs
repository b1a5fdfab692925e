use thiserror::Error;

/// Failures recording or forwarding an alert log block.
///
/// Only ever logged locally through `tracing`; they never affect playback or commands.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// Appending to or rewriting the local log file failed.
    #[error("Failed to write alert log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Sending the block to the remote log channel failed.
    ///
    /// Boxed due to large size.
    #[error("Failed to forward log block to channel {channel_id}: {source}")]
    Forward {
        channel_id: u64,
        #[source]
        source: Box<serenity::Error>,
    },
}
