//! Discord bot integration for voice alerts.
//!
//! The gateway handler turns voice state updates into presence updates for the alert event
//! loop and serves the `/setid` admin command. Songbird is registered on the same client, so
//! the bot's voice connections share its gateway shards.
//!
//! # Gateway Intents
//!
//! The bot requires the following gateway intents:
//! - `GUILDS` - Guild availability on ready, used to register `/setid` per guild
//! - `GUILD_VOICE_STATES` - Voice state updates for presence tracking and voice connections

pub mod command;
pub mod handler;
pub mod start;
