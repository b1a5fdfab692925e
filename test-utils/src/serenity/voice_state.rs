//! Test factory for creating Serenity VoiceState objects.
//!
//! Voice states are created by deserializing JSON shaped like the payload of a
//! `VOICE_STATE_UPDATE` gateway event.

use serenity::all::VoiceState;

use super::member::member_json;

/// Creates a test Serenity VoiceState.
///
/// # Arguments
/// - `user_id` - Discord user ID (snowflake) the state belongs to
/// - `guild_id` - Guild the voice state is in
/// - `channel_id` - Voice channel the user is connected to, `None` when disconnected
/// - `username` - When set, embeds a guild member with this username
///
/// # Returns
/// - `VoiceState` - A valid Serenity VoiceState struct for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a VoiceState (indicates invalid test data)
///
/// # Examples
///
/// ```rust,ignore
/// use test_utils::serenity::voice_state::create_test_voice_state;
///
/// // Member connected to channel 555
/// let state = create_test_voice_state(42, 1, Some(555), Some("someone"));
///
/// // Same member after disconnecting, without member data
/// let state = create_test_voice_state(42, 1, None, None);
/// ```
pub fn create_test_voice_state(
    user_id: u64,
    guild_id: u64,
    channel_id: Option<u64>,
    username: Option<&str>,
) -> VoiceState {
    serde_json::from_value(serde_json::json!({
        "channel_id": channel_id.map(|id| id.to_string()),
        "deaf": false,
        "guild_id": guild_id.to_string(),
        "member": username.map(|name| member_json(user_id, guild_id, name)),
        "mute": false,
        "self_deaf": false,
        "self_mute": false,
        "self_stream": false,
        "self_video": false,
        "session_id": "test-session",
        "suppress": false,
        "user_id": user_id.to_string(),
        "request_to_speak_timestamp": null,
    }))
    .expect("Failed to create test voice state - invalid JSON structure")
}
