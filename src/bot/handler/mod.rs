use std::sync::Arc;

use serenity::all::{Context, EventHandler, Interaction, Ready, VoiceState};
use serenity::async_trait;

use crate::service::alert::AlertHandle;
use crate::service::watch_target::WatchTargetRegistry;

pub mod interaction;
pub mod ready;
pub mod voice_state;

/// Discord bot event handler
pub struct Handler {
    pub registry: Arc<WatchTargetRegistry>,
    pub alerts: AlertHandle,
}

impl Handler {
    pub fn new(registry: Arc<WatchTargetRegistry>, alerts: AlertHandle) -> Self {
        Self { registry, alerts }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(ctx, ready).await;
    }

    /// Called when a member joins, leaves, moves or toggles mute in a voice channel
    async fn voice_state_update(&self, _ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        voice_state::handle_voice_state_update(&self.alerts, old, new);
    }

    /// Called when a slash command is invoked
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        interaction::handle_interaction_create(&self.registry, ctx, interaction).await;
    }
}
