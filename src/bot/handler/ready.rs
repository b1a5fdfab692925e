//! Ready event handler for bot initialization.
//!
//! Fired once the gateway handshake completes. Besides logging the connection, this is
//! where `/setid` gets registered: as a guild command in every guild listed in the ready
//! payload, so it is available immediately without global command propagation.

use serenity::all::{Context, Ready};

use crate::bot::command::setid;

/// Handles the ready event when the bot connects to Discord.
///
/// Registration failures are logged per guild and do not stop registration in the others.
///
/// # Arguments
/// - `ctx` - Discord context used for the command registration requests
/// - `ready` - Ready event data containing the bot user and its guilds
pub async fn handle_ready(ctx: Context, ready: Ready) {
    tracing::info!("Logged in as {}", ready.user.tag());

    tracing::info!("Registering /{} slash command...", setid::NAME);
    for guild in &ready.guilds {
        match guild.id.set_commands(&ctx.http, vec![setid::register()]).await {
            Ok(_) => tracing::info!("/{} command registered in guild: {}", setid::NAME, guild.id),
            Err(e) => tracing::error!(
                "Failed to register /{} in guild {}: {}",
                setid::NAME,
                guild.id,
                e
            ),
        }
    }
}
