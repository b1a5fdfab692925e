//! JSON for the guild member Discord embeds in a voice state update.

/// Builds the JSON for a guild member, shared with the voice state factory.
pub(crate) fn member_json(user_id: u64, guild_id: u64, username: &str) -> serde_json::Value {
    serde_json::json!({
        "user": {
            "id": user_id.to_string(),
            "username": username,
            "discriminator": "0",
            "global_name": null,
            "avatar": null,
            "bot": false,
        },
        "nick": null,
        "avatar": null,
        "roles": [],
        "joined_at": "2024-01-01T00:00:00.000000+00:00",
        "premium_since": null,
        "deaf": false,
        "mute": false,
        "flags": 0,
        "pending": false,
        "guild_id": guild_id.to_string(),
    })
}
