//! Business logic of the voice alert bot.
//!
//! - `watch_target` decides who is watched and which clip they get
//! - `voice` plays clips: resources, transport, session manager, leave debounce
//! - `alert` is the event loop tying presence updates to playback
//! - `alert_log` records alerts and liveness pings

pub mod alert;
pub mod alert_log;
pub mod voice;
pub mod watch_target;

#[cfg(test)]
pub(crate) mod test;
