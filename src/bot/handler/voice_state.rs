//! Voice state update handler.
//!
//! Converts serenity's voice states into [`PresenceUpdate`]s and hands them to the alert
//! event loop. Nothing here decides whether an update triggers playback; that happens in
//! the loop, one update at a time. The handler never awaits before enqueueing, so updates
//! for one member reach the loop in gateway order.

use serenity::all::VoiceState;

use crate::model::presence::PresenceUpdate;
use crate::service::alert::AlertHandle;

/// Handles a voice state update for one member.
///
/// # Arguments
/// - `alerts` - Event loop the presence update is delivered to
/// - `old` - Cached voice state before the change, if the cache had one
/// - `new` - Voice state after the change
pub fn handle_voice_state_update(alerts: &AlertHandle, old: Option<VoiceState>, new: VoiceState) {
    match presence_update(old.as_ref(), &new) {
        Some(update) => alerts.send_presence(update),
        None => tracing::debug!(
            "Ignoring voice state update outside a guild for user {}",
            new.user_id
        ),
    }
}

/// Builds the presence update for a voice state change.
///
/// # Returns
/// - `Some(PresenceUpdate)` - The change happened in a guild
/// - `None` - The voice state carries no guild id
pub fn presence_update(old: Option<&VoiceState>, new: &VoiceState) -> Option<PresenceUpdate> {
    let guild_id = new.guild_id?.get();

    let display_name = new
        .member
        .as_ref()
        .map(|member| member.user.tag())
        .unwrap_or_else(|| new.user_id.to_string());

    Some(PresenceUpdate {
        identifier: new.user_id.get().to_string(),
        guild_id,
        display_name,
        previous_channel: old.and_then(|state| state.channel_id).map(|id| id.get()),
        current_channel: new.channel_id.map(|id| id.get()),
    })
}
