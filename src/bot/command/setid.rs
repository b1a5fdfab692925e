//! `/setid` - changes the default watched identifier.

use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption};

use crate::error::watch::WatchError;
use crate::service::watch_target::WatchTargetRegistry;

pub const NAME: &str = "setid";
pub const USER_ID_OPTION: &str = "userid";

/// Builds the command definition registered in each guild.
pub fn register() -> CreateCommand {
    CreateCommand::new(NAME)
        .description("Set the allowed user ID for VC alerts (Admin only)")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                USER_ID_OPTION,
                "Discord User ID to allow",
            )
            .required(true),
        )
}

/// Runs the command and returns the text to reply with.
///
/// # Arguments
/// - `registry` - Registry holding the default identifier
/// - `caller_id` - Discord user id of the caller
/// - `channel_id` - Channel the command was issued in
/// - `identifier` - Raw `userid` option value
pub async fn run(
    registry: &WatchTargetRegistry,
    caller_id: u64,
    channel_id: u64,
    identifier: &str,
) -> String {
    let result = registry
        .set_default_identifier(caller_id, channel_id, identifier)
        .await;

    reply_text(&result)
}

fn reply_text(result: &Result<String, WatchError>) -> String {
    match result {
        Ok(identifier) => format!("✅ Allowed user ID updated to: `{}`", identifier),
        Err(e @ WatchError::Persist { .. }) => {
            tracing::error!("{}", e);
            "❌ Failed to save the new user ID. Please try again.".to_string()
        }
        Err(e) => e.to_string(),
    }
}
