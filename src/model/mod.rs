//! Domain models shared between the bot glue and the alert services.

pub mod presence;
