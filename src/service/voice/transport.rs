//! Voice transport abstraction.
//!
//! The playback session manager talks to Discord voice only through [`VoiceTransport`], so
//! the session state machine can be exercised without a gateway connection. The production
//! implementation is [`super::songbird::SongbirdTransport`].

use serenity::async_trait;

use crate::error::transport::TransportError;
use crate::service::alert::{AlertCommand, AlertHandle};
use crate::service::voice::audio::AudioResource;
use crate::service::voice::session::SessionId;

/// How a playback ended, as reported by the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackOutcome {
    /// The clip played to the end.
    Finished,
    /// The player failed mid-stream.
    Errored(String),
}

/// Reports the outcome of one session's playback back into the alert event loop.
///
/// Transports attach this to the player's end and error notifications. Each observer is
/// tagged with the session it was created for, so outcomes arriving after that session has
/// been replaced are recognised and ignored.
#[derive(Clone)]
pub struct PlaybackObserver {
    session: SessionId,
    alerts: AlertHandle,
}

impl PlaybackObserver {
    pub fn new(session: SessionId, alerts: AlertHandle) -> Self {
        Self { session, alerts }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Playback reached the end of the stream.
    pub fn finished(&self) {
        self.report(PlaybackOutcome::Finished);
    }

    /// Playback failed.
    pub fn errored(&self, reason: impl Into<String>) {
        self.report(PlaybackOutcome::Errored(reason.into()));
    }

    fn report(&self, outcome: PlaybackOutcome) {
        self.alerts.send(AlertCommand::PlaybackEnded {
            session: self.session,
            outcome,
        });
    }
}

/// Handle to the single audio stream of a session.
pub trait PlayerHandle: Send + Sync {
    /// Stops the stream. Stopping an already finished stream is a no-op.
    fn stop(&self);
}

/// Opens and closes voice connections and plays audio on them.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    /// Connects to `channel_id` in `guild_id`, self-deafened.
    async fn connect(&self, guild_id: u64, channel_id: u64) -> Result<(), TransportError>;

    /// Starts playing `resource` on the guild's connection, reporting the outcome to
    /// `observer`.
    async fn play(
        &self,
        guild_id: u64,
        resource: AudioResource,
        observer: PlaybackObserver,
    ) -> Result<Box<dyn PlayerHandle>, TransportError>;

    /// Destroys the guild's connection. Disconnecting with no connection is a no-op.
    async fn disconnect(&self, guild_id: u64) -> Result<(), TransportError>;
}
