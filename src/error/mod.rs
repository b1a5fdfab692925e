//! Error types for the voice alert bot.
//!
//! Each concern owns a `thiserror` enum in its own module. `AppError` covers what can fail
//! during startup and in top-level tasks, so `?` can be used there. Watch, transport and
//! notification errors never reach it: the command handler, the event loop and the alert
//! log catch them at their boundary and fall back to an idle state.

pub mod config;
pub mod notification;
pub mod transport;
pub mod watch;

use thiserror::Error;

use crate::error::config::ConfigError;

/// Top-level application error type.
///
/// Most variants use `#[from]` for automatic conversion from the domain-specific errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Filesystem or socket error outside of a more specific concern.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
