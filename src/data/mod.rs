//! File-backed persistence.
//!
//! The bot persists exactly two things: the default watched identifier and the local alert
//! log. Both are plain text files; these repositories own reading and writing them.

pub mod alert_log;
pub mod watch_target;
