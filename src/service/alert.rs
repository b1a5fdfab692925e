//! Voice alert event loop.
//!
//! Serenity dispatches gateway events concurrently, but the alert state machine has to see
//! them one at a time. [`AlertService`] is the single consumer of an unbounded channel;
//! presence updates from the gateway handler, elapsed leave timers and player outcomes are
//! all delivered to it as [`AlertCommand`]s and processed strictly in arrival order. The
//! service owns the pending-leave timers and the playback session manager, so nothing else
//! can mutate either. Alert records are written from their own tasks and never hold up
//! the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::model::presence::{PresenceTransition, PresenceUpdate};
use crate::service::alert_log::AlertSink;
use crate::service::voice::audio::AudioResourceBuilder;
use crate::service::voice::debounce::PendingLeaves;
use crate::service::voice::session::{PlaybackSessionManager, SessionId, SessionTarget};
use crate::service::voice::transport::{PlaybackOutcome, VoiceTransport};
use crate::service::watch_target::WatchTargetRegistry;

/// Messages processed by the alert event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertCommand {
    /// A member's voice state changed.
    Presence(PresenceUpdate),
    /// The grace timer started when `identifier` left voice has run out.
    LeaveElapsed { identifier: String, generation: u64 },
    /// The player of `session` stopped on its own.
    PlaybackEnded {
        session: SessionId,
        outcome: PlaybackOutcome,
    },
    /// Tear down the active session and stop the loop.
    Shutdown,
}

/// Sending half of the alert event loop's channel.
///
/// Cheap to clone; held by the gateway handler, the leave timers and player observers.
#[derive(Clone)]
pub struct AlertHandle {
    sender: UnboundedSender<AlertCommand>,
}

impl AlertHandle {
    /// Creates the channel feeding an [`AlertService`].
    pub fn channel() -> (Self, UnboundedReceiver<AlertCommand>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn send_presence(&self, update: PresenceUpdate) {
        self.send(AlertCommand::Presence(update));
    }

    pub fn shutdown(&self) {
        self.send(AlertCommand::Shutdown);
    }

    pub fn send(&self, command: AlertCommand) {
        if self.sender.send(command).is_err() {
            tracing::warn!("Alert event loop is not running, dropping command");
        }
    }
}

/// The presence-driven playback state machine.
pub struct AlertService<T: VoiceTransport> {
    receiver: UnboundedReceiver<AlertCommand>,
    registry: Arc<WatchTargetRegistry>,
    sessions: PlaybackSessionManager<T>,
    pending: PendingLeaves,
    sink: Arc<dyn AlertSink>,
}

impl<T: VoiceTransport> AlertService<T> {
    /// Creates the service.
    ///
    /// # Arguments
    /// - `receiver` - Receiving half from [`AlertHandle::channel`]
    /// - `alerts` - Sending half of the same channel, handed to timers and player observers
    /// - `registry` - Watch targets and clip selection
    /// - `transport` - Voice transport sessions are played on
    /// - `resources` - Builder for the alert clips
    /// - `sink` - Destination of alert log records
    /// - `leave_grace` - Debounce window between a leave and the teardown it triggers
    pub fn new(
        receiver: UnboundedReceiver<AlertCommand>,
        alerts: AlertHandle,
        registry: Arc<WatchTargetRegistry>,
        transport: T,
        resources: AudioResourceBuilder,
        sink: Arc<dyn AlertSink>,
        leave_grace: Duration,
    ) -> Self {
        Self {
            receiver,
            registry,
            sessions: PlaybackSessionManager::new(transport, resources, alerts.clone()),
            pending: PendingLeaves::new(leave_grace, alerts),
            sink,
        }
    }

    /// Processes commands until [`AlertCommand::Shutdown`] arrives, then tears down.
    pub async fn run(mut self) {
        tracing::info!("Voice alert event loop started");

        while let Some(command) = self.receiver.recv().await {
            if !self.handle(command).await {
                break;
            }
        }

        tracing::info!(
            "Voice alert event loop stopping, cancelling {} pending leave timer(s)",
            self.pending.len()
        );
        self.pending.clear();
        self.sessions.stop_session().await;
    }

    /// Processes one command.
    ///
    /// # Returns
    /// - `false` if the loop should stop
    async fn handle(&mut self, command: AlertCommand) -> bool {
        match command {
            AlertCommand::Presence(update) => self.on_presence(update).await,
            AlertCommand::LeaveElapsed {
                identifier,
                generation,
            } => self.on_leave_elapsed(&identifier, generation).await,
            AlertCommand::PlaybackEnded { session, outcome } => {
                if self.sessions.on_playback_ended(session, outcome).await {
                    tracing::info!("Alert playback finished, voice connection destroyed");
                }
            }
            AlertCommand::Shutdown => return false,
        }

        true
    }

    async fn on_presence(&mut self, update: PresenceUpdate) {
        if !self.registry.is_watched(&update.identifier).await {
            return;
        }

        match update.transition() {
            PresenceTransition::NoChange => {}
            PresenceTransition::Left { from } => {
                if self.pending.is_pending(&update.identifier) {
                    tracing::debug!(
                        "Replacing pending leave timer for {}",
                        update.identifier
                    );
                }
                self.pending.schedule(&update.identifier);
                tracing::info!(
                    "User {} left voice channel {}, waiting for a rejoin",
                    update.identifier,
                    from
                );
            }
            PresenceTransition::Joined { to } | PresenceTransition::Moved { to, .. } => {
                if self.pending.cancel(&update.identifier) {
                    tracing::debug!("User {} rejoined within the grace window", update.identifier);
                }

                let target = SessionTarget {
                    guild_id: update.guild_id,
                    channel_id: to,
                };
                let clip = self.registry.clip_for(&update.identifier).to_path_buf();

                match self.sessions.start_session(target, &clip).await {
                    Ok(_) => self.record_alert(update),
                    Err(e) => tracing::error!("Error joining voice channel or playing audio: {}", e),
                }
            }
        }
    }

    /// Records the alert on a separate task; the sink may wait on Discord rate limits.
    fn record_alert(&self, update: PresenceUpdate) {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            sink.voice_alert(&update).await;
        });
    }

    async fn on_leave_elapsed(&mut self, identifier: &str, generation: u64) {
        if !self.pending.expire(identifier, generation) {
            return;
        }

        let Some((session, target)) = self.sessions.active() else {
            return;
        };

        self.sessions.stop_session().await;
        tracing::info!(
            "User {} fully left voice, destroyed connection {} to channel {}",
            identifier,
            session,
            target.channel_id
        );
    }
}
