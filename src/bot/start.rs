use std::sync::Arc;

use serenity::all::{Client, GatewayIntents};
use songbird::{SerenityInit, Songbird};

use crate::bot::handler::Handler;
use crate::config::Config;
use crate::error::AppError;

/// Builds the Discord client with the voice manager registered.
///
/// The client is returned unstarted so its HTTP client can be shared with the alert log
/// forwarder before the gateway connection is opened.
///
/// # Arguments
/// - `config` - Application configuration providing the bot token
/// - `handler` - Gateway event handler
/// - `songbird` - Voice manager shared with the voice transport
///
/// # Returns
/// - `Ok(Client)` - Client ready to be started
/// - `Err(AppError)` - Client construction failed
pub async fn init_bot(
    config: &Config,
    handler: Handler,
    songbird: Arc<Songbird>,
) -> Result<Client, AppError> {
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_VOICE_STATES;

    let client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird_with(songbird)
        .await?;

    Ok(client)
}

/// Connects the client to the gateway, blocking until every shard shuts down.
///
/// # Returns
/// - `Ok(())` - The client shut down cleanly
/// - `Err(AppError)` - The gateway connection failed
pub async fn start_bot(client: &mut Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
