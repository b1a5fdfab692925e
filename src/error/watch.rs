use thiserror::Error;

/// Failures of the watch-target registry's admin operation.
///
/// The `Display` text of the first three variants is shown to the caller verbatim, so it is
/// phrased for a Discord user rather than for the logs.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The command was issued outside the designated control channel.
    #[error("❌ This command can only be used in the authorized channel.")]
    WrongChannel,

    /// The caller is not in the admin allow-list.
    #[error("❌ You are not authorized to use this command.")]
    Unauthorized,

    /// The identifier is empty or contains something other than decimal digits.
    #[error("❌ Invalid ID format. Must be numeric.")]
    InvalidFormat(String),

    /// Writing the identifier file failed. The in-memory value is left unchanged.
    #[error("Failed to persist watched identifier to {path}: {source}")]
    Persist {
        /// Path of the identifier file
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
