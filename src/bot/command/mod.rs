//! Slash commands registered by the bot.

pub mod setid;
