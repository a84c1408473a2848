//! Ordered list of queued timers

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Longest accepted timer, 100 years. Keeps end instants and sums representable.
pub const MAX_DURATION_SECONDS: u64 = 100 * 365 * 24 * 3600;

fn storable(duration_seconds: u64) -> bool {
    (1..=MAX_DURATION_SECONDS).contains(&duration_seconds)
}

/// A single queued countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDefinition {
    /// Stable identity, never reused within a session
    pub id: u64,
    pub duration_seconds: u64,
}

/// Timer sequence in playback order.
///
/// While playback is active the sequence is locked and every mutation is
/// ignored, so the engine's snapshot always matches what is stored here.
#[derive(Debug, Clone)]
pub struct TimerSequence {
    timers: Vec<TimerDefinition>,
    next_id: u64,
    locked: bool,
}

impl TimerSequence {
    /// Create an empty, unlocked sequence
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
            locked: false,
        }
    }

    /// Append a timer and return its id.
    /// Returns `None` when locked or when the duration is zero or too long.
    pub fn add(&mut self, duration_seconds: u64) -> Option<u64> {
        if self.locked || !storable(duration_seconds) {
            debug!(
                duration_seconds,
                locked = self.locked,
                "Ignoring add on timer sequence"
            );
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.timers.push(TimerDefinition {
            id,
            duration_seconds,
        });
        Some(id)
    }

    /// Remove the timer with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        if self.locked {
            debug!(id, "Ignoring remove on locked timer sequence");
            return false;
        }
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Replace the duration of the timer with `id`. Returns whether it changed.
    pub fn edit(&mut self, id: u64, duration_seconds: u64) -> bool {
        if self.locked || !storable(duration_seconds) {
            debug!(
                id,
                duration_seconds,
                locked = self.locked,
                "Ignoring edit on timer sequence"
            );
            return false;
        }
        match self.timers.iter_mut().find(|timer| timer.id == id) {
            Some(timer) => {
                timer.duration_seconds = duration_seconds;
                true
            }
            None => false,
        }
    }

    pub fn timers(&self) -> &[TimerDefinition] {
        &self.timers
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn can_edit(&self) -> bool {
        !self.locked
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    pub(crate) fn unlock(&mut self) {
        self.locked = false;
    }
}

impl Default for TimerSequence {
    fn default() -> Self {
        Self::new()
    }
}
