//! Songbird implementation of the voice transport.

use std::sync::Arc;

use serenity::all::{ChannelId, GuildId};
use serenity::async_trait;
use songbird::error::JoinError;
use songbird::events::{Event, EventContext, EventHandler as VoiceEventHandler, TrackEvent};
use songbird::input::{File, Input};
use songbird::tracks::{PlayMode, Track, TrackHandle};
use songbird::Songbird;

use crate::error::transport::TransportError;
use crate::service::voice::audio::AudioResource;
use crate::service::voice::transport::{PlaybackObserver, PlayerHandle, VoiceTransport};

/// Voice transport backed by the songbird manager registered with the serenity client.
pub struct SongbirdTransport {
    manager: Arc<Songbird>,
}

impl SongbirdTransport {
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl VoiceTransport for SongbirdTransport {
    async fn connect(&self, guild_id: u64, channel_id: u64) -> Result<(), TransportError> {
        let call = self
            .manager
            .join(GuildId::new(guild_id), ChannelId::new(channel_id))
            .await
            .map_err(|e| TransportError::Join {
                guild_id,
                channel_id,
                reason: e.to_string(),
            })?;

        // Transmit only; never receive other members' audio
        let mut call = call.lock().await;
        if let Err(e) = call.deafen(true).await {
            tracing::warn!("Failed to self-deafen in guild {}: {}", guild_id, e);
        }

        Ok(())
    }

    async fn play(
        &self,
        guild_id: u64,
        resource: AudioResource,
        observer: PlaybackObserver,
    ) -> Result<Box<dyn PlayerHandle>, TransportError> {
        let call = self
            .manager
            .get(GuildId::new(guild_id))
            .ok_or(TransportError::NotConnected(guild_id))?;

        let input: Input = File::new(resource.path().to_path_buf()).into();
        let track = Track::new(input).volume(resource.volume());

        let handle = call.lock().await.play_only(track);

        handle
            .add_event(
                Event::Track(TrackEvent::End),
                TrackOutcomeNotifier::finished(observer.clone()),
            )
            .map_err(|e| TransportError::Play(e.to_string()))?;
        handle
            .add_event(
                Event::Track(TrackEvent::Error),
                TrackOutcomeNotifier::errored(observer),
            )
            .map_err(|e| TransportError::Play(e.to_string()))?;

        Ok(Box::new(SongbirdPlayer(handle)))
    }

    async fn disconnect(&self, guild_id: u64) -> Result<(), TransportError> {
        match self.manager.remove(GuildId::new(guild_id)).await {
            Ok(()) | Err(JoinError::NoCall) => Ok(()),
            Err(e) => Err(TransportError::Leave {
                guild_id,
                reason: e.to_string(),
            }),
        }
    }
}

struct SongbirdPlayer(TrackHandle);

impl PlayerHandle for SongbirdPlayer {
    fn stop(&self) {
        if let Err(e) = self.0.stop() {
            tracing::debug!("Track already stopped: {}", e);
        }
    }
}

#[derive(Clone, Copy)]
enum TrackOutcome {
    Finished,
    Errored,
}

/// Forwards a track end or error event to the session's observer.
struct TrackOutcomeNotifier {
    outcome: TrackOutcome,
    observer: PlaybackObserver,
}

impl TrackOutcomeNotifier {
    fn finished(observer: PlaybackObserver) -> Self {
        Self {
            outcome: TrackOutcome::Finished,
            observer,
        }
    }

    fn errored(observer: PlaybackObserver) -> Self {
        Self {
            outcome: TrackOutcome::Errored,
            observer,
        }
    }
}

#[async_trait]
impl VoiceEventHandler for TrackOutcomeNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        match self.outcome {
            TrackOutcome::Finished => self.observer.finished(),
            TrackOutcome::Errored => {
                let reason = match ctx {
                    EventContext::Track(tracks) => tracks.iter().find_map(|(state, _)| {
                        match &state.playing {
                            PlayMode::Errored(e) => Some(format!("{e:?}")),
                            _ => None,
                        }
                    }),
                    _ => None,
                };
                self.observer
                    .errored(reason.unwrap_or_else(|| "unknown track error".to_string()));
            }
        }

        tracing::debug!("Player event delivered for session {}", self.observer.session());

        None
    }
}
