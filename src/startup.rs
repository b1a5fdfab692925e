use std::sync::Arc;

use serenity::cache::Cache;
use serenity::http::Http;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::data::alert_log::AlertLogFile;
use crate::data::watch_target::WatchTargetStore;
use crate::error::AppError;
use crate::service::alert_log::{AlertLog, ChannelNames, LogForwarder};
use crate::service::watch_target::{AlertClips, CommandPolicy, WatchTargetRegistry};

/// Installs the global tracing subscriber.
///
/// Verbosity follows `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds the watch-target registry from configuration.
///
/// Loads the persisted default identifier from the configured identifier file. A missing
/// file is not an error; the bot then only watches the special identifiers until `/setid`
/// is used.
///
/// # Arguments
/// - `config` - Application configuration with admin ids, control channel and clip paths
///
/// # Returns
/// - `Ok(WatchTargetRegistry)` - Registry ready for the gateway handler and event loop
/// - `Err(AppError)` - The identifier file exists but could not be read
pub async fn load_registry(config: &Config) -> Result<WatchTargetRegistry, AppError> {
    let store = WatchTargetStore::new(&config.watch_id_file);
    let policy = CommandPolicy {
        admin_ids: config.admin_ids.clone(),
        command_channel_id: config.command_channel_id,
    };
    let clips = AlertClips {
        default: config.audio_file.clone(),
        special: config.special_audio.clone(),
    };

    for (identifier, clip) in &clips.special {
        tracing::info!("Special clip for {}: {}", identifier, clip.display());
    }

    let registry = WatchTargetRegistry::load(store, policy, clips).await?;

    Ok(registry)
}

/// Creates the alert log and prunes entries past the retention window.
///
/// Blocks are forwarded to the configured log channel through the bot's HTTP client, and
/// channel names are resolved through the bot's cache. A failed startup prune is logged
/// and otherwise ignored.
///
/// # Arguments
/// - `config` - Application configuration with log file, timezone and log channel
/// - `discord_cache` - Bot cache used for channel name lookups
/// - `discord_http` - Bot HTTP client used for forwarding and cache misses
pub async fn setup_alert_log(
    config: &Config,
    discord_cache: Arc<Cache>,
    discord_http: Arc<Http>,
) -> AlertLog {
    let forwarder = config
        .log_channel_id
        .map(|channel_id| LogForwarder::new(discord_http.clone(), channel_id));

    if forwarder.is_none() {
        tracing::info!("LOG_CHANNEL_ID not set, alert log stays local");
    }

    let alert_log = AlertLog::new(
        AlertLogFile::new(&config.log_file),
        config.timezone,
        forwarder,
        Some(ChannelNames::new(discord_cache, discord_http)),
    );

    if let Err(e) = alert_log
        .prune(chrono::Duration::days(config.log_retention_days))
        .await
    {
        tracing::error!("{}", e);
    }

    alert_log
}
