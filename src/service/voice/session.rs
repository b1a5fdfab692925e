//! Playback session manager.
//!
//! Owns the process-wide (connection, player) pair. There is at most one session at a time:
//! starting a session always tears down the previous one first, and every failure path
//! leaves no session behind. The manager is owned by the alert event loop and mutated only
//! through `&mut self`, which serializes every change to the session.

use std::fmt;
use std::path::Path;

use crate::error::transport::TransportError;
use crate::service::alert::AlertHandle;
use crate::service::voice::audio::AudioResourceBuilder;
use crate::service::voice::transport::{
    PlaybackObserver, PlaybackOutcome, PlayerHandle, VoiceTransport,
};

/// Identifies one started session. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Voice channel a session plays into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTarget {
    pub guild_id: u64,
    pub channel_id: u64,
}

struct PlaybackSession {
    id: SessionId,
    target: SessionTarget,
    player: Box<dyn PlayerHandle>,
}

pub struct PlaybackSessionManager<T: VoiceTransport> {
    transport: T,
    resources: AudioResourceBuilder,
    alerts: AlertHandle,
    active: Option<PlaybackSession>,
    next_id: u64,
}

impl<T: VoiceTransport> PlaybackSessionManager<T> {
    /// Creates a manager with no active session.
    ///
    /// # Arguments
    /// - `transport` - Voice transport used to connect and play
    /// - `resources` - Builder turning clip paths into playable resources
    /// - `alerts` - Handle player outcomes are reported through
    pub fn new(transport: T, resources: AudioResourceBuilder, alerts: AlertHandle) -> Self {
        Self {
            transport,
            resources,
            alerts,
            active: None,
            next_id: 1,
        }
    }

    /// Returns the id and target of the active session, if any.
    pub fn active(&self) -> Option<(SessionId, SessionTarget)> {
        self.active.as_ref().map(|s| (s.id, s.target))
    }

    /// Tears down any active session, then connects to `target` and plays `clip` once.
    ///
    /// On failure any connection opened for the new session is destroyed again, so no
    /// session is left active.
    ///
    /// # Returns
    /// - `Ok(SessionId)` - Connected and playing
    /// - `Err(TransportError)` - Connecting, building the resource or starting playback
    ///   failed
    pub async fn start_session(
        &mut self,
        target: SessionTarget,
        clip: &Path,
    ) -> Result<SessionId, TransportError> {
        self.stop_session().await;

        let id = SessionId(self.next_id);
        self.next_id += 1;

        if let Err(e) = self
            .transport
            .connect(target.guild_id, target.channel_id)
            .await
        {
            self.abandon(target).await;
            return Err(e);
        }

        let resource = match self.resources.build(clip).await {
            Ok(resource) => resource,
            Err(e) => {
                self.abandon(target).await;
                return Err(e);
            }
        };

        let observer = PlaybackObserver::new(id, self.alerts.clone());
        let player = match self
            .transport
            .play(target.guild_id, resource, observer)
            .await
        {
            Ok(player) => player,
            Err(e) => {
                self.abandon(target).await;
                return Err(e);
            }
        };

        tracing::debug!(
            "Session {} playing {} in channel {}",
            id,
            clip.display(),
            target.channel_id
        );
        self.active = Some(PlaybackSession { id, target, player });

        Ok(id)
    }

    /// Stops the player and destroys the connection of the active session.
    ///
    /// # Returns
    /// - `true` - A session was active and has been torn down
    /// - `false` - Nothing was active; nothing was done
    pub async fn stop_session(&mut self) -> bool {
        let Some(session) = self.active.take() else {
            return false;
        };

        session.player.stop();
        if let Err(e) = self.transport.disconnect(session.target.guild_id).await {
            tracing::warn!("Failed to destroy voice connection: {}", e);
        }

        tracing::debug!("Session {} torn down", session.id);
        true
    }

    /// Handles a player outcome reported for session `id`.
    ///
    /// Errors are logged. Either outcome tears the session down, since the clip plays once.
    /// Outcomes for a session that is no longer active are ignored; stopping a player on
    /// teardown reports one of those.
    ///
    /// # Returns
    /// - `true` - The outcome belonged to the active session, which was torn down
    /// - `false` - The outcome was stale
    pub async fn on_playback_ended(&mut self, id: SessionId, outcome: PlaybackOutcome) -> bool {
        if let PlaybackOutcome::Errored(reason) = &outcome {
            tracing::error!("Audio player error in session {}: {}", id, reason);
        }

        if self.active.as_ref().map(|s| s.id) != Some(id) {
            tracing::debug!("Ignoring {:?} for stale session {}", outcome, id);
            return false;
        }

        self.stop_session().await
    }

    /// Destroys a connection opened for a session that failed to start.
    async fn abandon(&mut self, target: SessionTarget) {
        if let Err(e) = self.transport.disconnect(target.guild_id).await {
            tracing::warn!(
                "Failed to destroy half-open voice connection in guild {}: {}",
                target.guild_id,
                e
            );
        }
    }
}
