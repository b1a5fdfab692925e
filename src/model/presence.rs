//! Presence domain models.
//!
//! A `PresenceUpdate` is the platform-independent form of a Discord voice state change for a
//! single member. `PresenceTransition` is what the update means for that member, derived by
//! comparing the channel they were in with the channel they are in now.

/// A voice presence change for one member, as delivered to the alert event loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceUpdate {
    /// Discord user id of the member, as a numeric string.
    pub identifier: String,
    /// Guild the voice state belongs to.
    pub guild_id: u64,
    /// Display tag of the member, used in log records.
    pub display_name: String,
    /// Voice channel the member was in before the change, if known.
    pub previous_channel: Option<u64>,
    /// Voice channel the member is in after the change.
    pub current_channel: Option<u64>,
}

impl PresenceUpdate {
    /// Classifies this update, see [`classify`].
    pub fn transition(&self) -> PresenceTransition {
        classify(self.previous_channel, self.current_channel)
    }
}

/// What a presence change means for the member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// Same channel before and after (mute toggles, duplicate events) or never in voice.
    NoChange,
    /// Left voice entirely.
    Left { from: u64 },
    /// Entered voice from nowhere.
    Joined { to: u64 },
    /// Switched from one channel to another.
    Moved { from: u64, to: u64 },
}

/// Classifies a presence change from the previous and new voice channel.
///
/// Total over every combination of absent/present and equal/different channels.
pub fn classify(previous: Option<u64>, current: Option<u64>) -> PresenceTransition {
    match (previous, current) {
        (None, None) => PresenceTransition::NoChange,
        (Some(from), None) => PresenceTransition::Left { from },
        (None, Some(to)) => PresenceTransition::Joined { to },
        (Some(from), Some(to)) if from == to => PresenceTransition::NoChange,
        (Some(from), Some(to)) => PresenceTransition::Moved { from, to },
    }
}
