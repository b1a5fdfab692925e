//! Event logger for voice alerts and liveness pings.
//!
//! Every alert and keep-alive ping becomes a framed text block with a `Date/Time:` line.
//! The block is printed through `tracing`, appended to the local alert log file and
//! forwarded in a code block to the configured Discord log channel. Failures at any of
//! these sinks are logged and otherwise ignored.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use serenity::all::{ChannelId, CreateMessage};
use serenity::async_trait;
use serenity::cache::Cache;
use serenity::http::Http;

use crate::data::alert_log::{AlertLogFile, TIMESTAMP_FORMAT, TIMESTAMP_MARKER};
use crate::error::notification::NotificationError;
use crate::model::presence::PresenceUpdate;

const ALERT_HEADER: &str = "━━━━━━━━━━━━━━━ 🔊 VC ALERT ━━━━━━━━━━━━━━━";
const KEEP_ALIVE_HEADER: &str = "━━━━━━━━━━━━━━━ 📡 KEEP-ALIVE ━━━━━━━━━━━━━━━";
const FOOTER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Destination for alert and keep-alive records.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Records that a watched member joined or moved to a voice channel.
    async fn voice_alert(&self, update: &PresenceUpdate);

    /// Records a liveness ping.
    async fn keep_alive(&self);
}

/// Formats the block recorded when a watched member triggers an alert.
///
/// `channel_name` falls back to the channel id when it could not be resolved.
pub fn voice_alert_block<T: TimeZone>(
    now: &DateTime<T>,
    update: &PresenceUpdate,
    channel_name: Option<&str>,
) -> String
where
    T::Offset: std::fmt::Display,
{
    let channel = match (channel_name, update.current_channel) {
        (Some(name), _) => name.to_string(),
        (None, Some(id)) => id.to_string(),
        (None, None) => "unknown".to_string(),
    };

    [
        ALERT_HEADER.to_string(),
        format!("📅  {} {}", TIMESTAMP_MARKER, now.format(TIMESTAMP_FORMAT)),
        format!("👤  User: {} (ID: {})", update.display_name, update.identifier),
        format!("📢  Joined VC: {}", channel),
        FOOTER.to_string(),
    ]
    .join("\n")
}

/// Formats the block recorded for a liveness ping.
pub fn keep_alive_block<T: TimeZone>(now: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    [
        KEEP_ALIVE_HEADER.to_string(),
        format!("📅  {} {}", TIMESTAMP_MARKER, now.format(TIMESTAMP_FORMAT)),
        "✅  Ping received!".to_string(),
        "📈  Data Spike: ▓▓▓▓".to_string(),
        FOOTER.to_string(),
    ]
    .join("\n")
}

/// Forwards log blocks to a Discord text channel.
pub struct LogForwarder {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl LogForwarder {
    pub fn new(http: Arc<Http>, channel_id: u64) -> Self {
        Self {
            http,
            channel_id: ChannelId::new(channel_id),
        }
    }

    /// Sends `block` wrapped in a code fence.
    pub async fn forward(&self, block: &str) -> Result<(), NotificationError> {
        let message = CreateMessage::new().content(format!("```\n{block}\n```"));

        self.channel_id
            .send_message(&self.http, message)
            .await
            .map_err(|e| NotificationError::Forward {
                channel_id: self.channel_id.get(),
                source: Box::new(e),
            })?;

        Ok(())
    }
}

/// Resolves voice channel names for alert records, cache first.
pub struct ChannelNames {
    cache: Arc<Cache>,
    http: Arc<Http>,
}

impl ChannelNames {
    pub fn new(cache: Arc<Cache>, http: Arc<Http>) -> Self {
        Self { cache, http }
    }

    /// Looks up the name of `channel_id`, fetching it over HTTP on a cache miss.
    pub async fn name(&self, channel_id: u64) -> Option<String> {
        match ChannelId::new(channel_id)
            .name((&self.cache, self.http.as_ref()))
            .await
        {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::warn!("Failed to resolve name of channel {}: {}", channel_id, e);
                None
            }
        }
    }
}

/// The production alert sink: tracing output, local file and optional Discord channel.
pub struct AlertLog {
    file: AlertLogFile,
    timezone: Tz,
    forwarder: Option<LogForwarder>,
    channels: Option<ChannelNames>,
}

impl AlertLog {
    /// Creates the alert log.
    ///
    /// # Arguments
    /// - `file` - Local log file blocks are appended to
    /// - `timezone` - Zone the `Date/Time:` line is rendered in
    /// - `forwarder` - Remote channel forwarder, `None` to keep logs local
    /// - `channels` - Channel name lookup, `None` to log channel ids
    pub fn new(
        file: AlertLogFile,
        timezone: Tz,
        forwarder: Option<LogForwarder>,
        channels: Option<ChannelNames>,
    ) -> Self {
        Self {
            file,
            timezone,
            forwarder,
            channels,
        }
    }

    /// Removes blocks older than `retention` from the local file.
    pub async fn prune(&self, retention: Duration) -> Result<usize, NotificationError> {
        let removed = self.file.prune(Utc::now(), retention).await?;
        if removed > 0 {
            tracing::info!(
                "Pruned {} log entries older than {} days from {}",
                removed,
                retention.num_days(),
                self.file.path().display()
            );
        }
        Ok(removed)
    }

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    async fn record(&self, block: String) {
        tracing::info!("\n{}", block);

        if let Err(e) = self.file.append(&block).await {
            tracing::error!("{}", e);
        }

        if let Some(forwarder) = &self.forwarder {
            if let Err(e) = forwarder.forward(&block).await {
                tracing::error!("{}", e);
            }
        }
    }
}

#[async_trait]
impl AlertSink for AlertLog {
    async fn voice_alert(&self, update: &PresenceUpdate) {
        let channel_name = match (&self.channels, update.current_channel) {
            (Some(channels), Some(channel_id)) => channels.name(channel_id).await,
            _ => None,
        };

        self.record(voice_alert_block(&self.now(), update, channel_name.as_deref()))
            .await;
    }

    async fn keep_alive(&self) {
        self.record(keep_alive_block(&self.now())).await;
    }
}
