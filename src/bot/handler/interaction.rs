use serenity::all::{
    Context, CreateInteractionResponse, CreateInteractionResponseMessage, Interaction,
};

use crate::bot::command::setid;
use crate::service::watch_target::WatchTargetRegistry;

/// Handles slash command interactions.
///
/// Only `/setid` is served; every other interaction is ignored. The reply is ephemeral so
/// only the caller sees it.
pub async fn handle_interaction_create(
    registry: &WatchTargetRegistry,
    ctx: Context,
    interaction: Interaction,
) {
    let Interaction::Command(command) = interaction else {
        return;
    };

    if command.data.name != setid::NAME {
        return;
    }

    let identifier = command
        .data
        .options
        .iter()
        .find(|option| option.name == setid::USER_ID_OPTION)
        .and_then(|option| option.value.as_str())
        .unwrap_or_default();

    let content = setid::run(
        registry,
        command.user.id.get(),
        command.channel_id.get(),
        identifier,
    )
    .await;

    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    );

    if let Err(e) = command.create_response(&ctx.http, response).await {
        tracing::error!("Failed to reply to /{}: {}", setid::NAME, e);
    }
}
