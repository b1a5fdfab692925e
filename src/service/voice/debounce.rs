//! Debounced leave handling.
//!
//! Discord may report a member hopping between voice channels as a leave followed by a
//! join. Instead of tearing the session down on the leave, a grace timer is started per
//! identifier; a rejoin within the window cancels it. When the timer fires it sends
//! [`AlertCommand::LeaveElapsed`] back into the event loop rather than acting itself, so the
//! teardown is serialized with every other event.

use std::collections::HashMap;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::service::alert::{AlertCommand, AlertHandle};

struct PendingLeave {
    generation: u64,
    timer: JoinHandle<()>,
}

/// Pending-leave timers keyed by identifier.
pub struct PendingLeaves {
    delay: Duration,
    alerts: AlertHandle,
    entries: HashMap<String, PendingLeave>,
    next_generation: u64,
}

impl PendingLeaves {
    pub fn new(delay: Duration, alerts: AlertHandle) -> Self {
        Self {
            delay,
            alerts,
            entries: HashMap::new(),
            next_generation: 1,
        }
    }

    /// Starts the grace timer for `identifier`, replacing any timer already pending for it.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    /// - The generation of the new timer, carried by its `LeaveElapsed` message
    pub fn schedule(&mut self, identifier: &str) -> u64 {
        self.cancel(identifier);

        let generation = self.next_generation;
        self.next_generation += 1;

        let delay = self.delay;
        let alerts = self.alerts.clone();
        let owned = identifier.to_string();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            alerts.send(AlertCommand::LeaveElapsed {
                identifier: owned,
                generation,
            });
        });

        self.entries
            .insert(identifier.to_string(), PendingLeave { generation, timer });

        generation
    }

    /// Cancels the pending timer for `identifier`.
    ///
    /// # Returns
    /// - `true` - A timer was pending and has been cancelled
    /// - `false` - Nothing was pending
    pub fn cancel(&mut self, identifier: &str) -> bool {
        match self.entries.remove(identifier) {
            Some(pending) => {
                pending.timer.abort();
                true
            }
            None => false,
        }
    }

    /// Consumes the pending entry for an elapsed timer.
    ///
    /// A timer can elapse after it was cancelled or replaced if its message was already
    /// queued; such an expiry no longer matches the entry's generation.
    ///
    /// # Returns
    /// - `true` - The expiry is current; the entry has been removed and teardown is due
    /// - `false` - The expiry is stale and must be ignored
    pub fn expire(&mut self, identifier: &str, generation: u64) -> bool {
        match self.entries.get(identifier) {
            Some(pending) if pending.generation == generation => {
                self.entries.remove(identifier);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Number of identifiers with a pending timer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Cancels every pending timer.
    pub fn clear(&mut self) {
        for (_, pending) in self.entries.drain() {
            pending.timer.abort();
        }
    }
}

impl Drop for PendingLeaves {
    fn drop(&mut self) {
        self.clear();
    }
}
