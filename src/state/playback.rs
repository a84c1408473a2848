//! Playback engine for a timer sequence.
//!
//! The engine is a plain state machine driven by explicit instants. It owns no
//! task or timer of its own: the caller invokes [`PlaybackEngine::tick`] on a
//! fixed cadence and dispatches the returned events.
//!
//! ```text
//! Idle --start--> Running <--pause/resume--> Paused
//!   ^                |                          |
//!   +----reset / last timer finished------------+
//! ```
//!
//! Remaining time is always recomputed from the absolute end instant of the
//! current timer, never decremented per tick, so late or skipped ticks only
//! delay the display and never the countdown itself.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use super::sequence::TimerDefinition;
use crate::utils::duration::format_duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy)]
enum PlaybackState {
    Idle,
    Running {
        index: usize,
        ends_at: Instant,
        remaining: Duration,
    },
    Paused {
        index: usize,
        ends_at: Instant,
        paused_at: Instant,
        remaining: Duration,
    },
}

/// Something observable that happened during playback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PlaybackEvent {
    TimerStarted {
        index: usize,
        id: u64,
        duration_seconds: u64,
    },
    TimerFinished {
        index: usize,
        id: u64,
        duration_seconds: u64,
        label: String,
    },
    AllDone,
    Paused {
        index: usize,
        remaining_ms: u64,
    },
    Resumed {
        index: usize,
        remaining_ms: u64,
    },
    Reset,
}

/// Result of a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub events: Vec<PlaybackEvent>,
    /// The last timer finished and the engine went back to idle
    pub finished: bool,
}

/// Derived, read-only view of the engine against a sequence
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub phase: Phase,
    pub current_index: usize,
    pub remaining_in_current: Duration,
    /// Full duration of the timer at `current_index`, 0 when there is none
    pub current_duration_seconds: u64,
    pub total_seconds: u64,
    pub total_remaining: Duration,
    pub display_remaining: Duration,
}

#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    state: PlaybackState,
    /// Copy of the sequence taken at start, empty while idle
    queue: Vec<TimerDefinition>,
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            queue: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            PlaybackState::Idle => Phase::Idle,
            PlaybackState::Running { .. } => Phase::Running,
            PlaybackState::Paused { .. } => Phase::Paused,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, PlaybackState::Idle)
    }

    /// Index of the current timer, 0 while idle
    pub fn current_index(&self) -> usize {
        match self.state {
            PlaybackState::Idle => 0,
            PlaybackState::Running { index, .. } | PlaybackState::Paused { index, .. } => index,
        }
    }

    /// Remaining time of the current timer as of the last tick, zero while idle
    pub fn remaining_in_current(&self) -> Duration {
        match self.state {
            PlaybackState::Idle => Duration::ZERO,
            PlaybackState::Running { remaining, .. } | PlaybackState::Paused { remaining, .. } => {
                remaining
            }
        }
    }

    /// Begin playback from the first timer.
    ///
    /// Ignored when the sequence is empty or playback is already active.
    pub fn start(&mut self, timers: &[TimerDefinition], now: Instant) -> Option<PlaybackEvent> {
        if !self.is_idle() {
            return None;
        }
        let first = *timers.first()?;
        self.queue = timers.to_vec();
        Some(self.make_current(0, first, now))
    }

    /// Re-evaluate the current timer against `now`.
    ///
    /// No-op unless running. At most one timer completes per tick.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let PlaybackState::Running { index, ends_at, .. } = self.state else {
            return TickOutcome::default();
        };

        let remaining = ends_at.saturating_duration_since(now);
        if !remaining.is_zero() {
            self.state = PlaybackState::Running {
                index,
                ends_at,
                remaining,
            };
            return TickOutcome::default();
        }

        let mut outcome = TickOutcome::default();
        if let Some(done) = self.queue.get(index) {
            outcome.events.push(PlaybackEvent::TimerFinished {
                index,
                id: done.id,
                duration_seconds: done.duration_seconds,
                label: timer_label(index, done.duration_seconds),
            });
        }

        match self.queue.get(index + 1).copied() {
            Some(next) => {
                let started = self.make_current(index + 1, next, now);
                outcome.events.push(started);
            }
            None => {
                outcome.events.push(PlaybackEvent::AllDone);
                outcome.finished = true;
                self.go_idle();
            }
        }
        outcome
    }

    /// Freeze the countdown. Ignored unless running.
    pub fn pause(&mut self, now: Instant) -> Option<PlaybackEvent> {
        let PlaybackState::Running {
            index,
            ends_at,
            remaining,
        } = self.state
        else {
            return None;
        };
        self.state = PlaybackState::Paused {
            index,
            ends_at,
            paused_at: now,
            remaining,
        };
        Some(PlaybackEvent::Paused {
            index,
            remaining_ms: millis(remaining),
        })
    }

    /// Continue after a pause; the end instant moves forward by the time spent
    /// paused. Ignored unless paused.
    pub fn resume(&mut self, now: Instant) -> Option<PlaybackEvent> {
        let PlaybackState::Paused {
            index,
            ends_at,
            paused_at,
            remaining,
        } = self.state
        else {
            return None;
        };
        let paused_for = now.saturating_duration_since(paused_at);
        self.state = PlaybackState::Running {
            index,
            ends_at: deadline(ends_at, paused_for),
            remaining,
        };
        Some(PlaybackEvent::Resumed {
            index,
            remaining_ms: millis(remaining),
        })
    }

    /// Pause when running, resume when paused
    pub fn toggle_pause(&mut self, now: Instant) -> Option<PlaybackEvent> {
        match self.state {
            PlaybackState::Running { .. } => self.pause(now),
            PlaybackState::Paused { .. } => self.resume(now),
            PlaybackState::Idle => None,
        }
    }

    /// Return to idle from any state. Returns `None` when already idle.
    pub fn reset(&mut self) -> Option<PlaybackEvent> {
        if self.is_idle() {
            return None;
        }
        self.go_idle();
        Some(PlaybackEvent::Reset)
    }

    /// Derive display quantities. `sequence` is the stored list, which equals
    /// the engine's own copy whenever playback is active.
    pub fn snapshot(&self, sequence: &[TimerDefinition]) -> PlaybackSnapshot {
        let timers = if self.is_idle() {
            sequence
        } else {
            &self.queue[..]
        };
        let phase = self.phase();
        let current_index = self.current_index();
        let remaining_in_current = self.remaining_in_current();
        let current_duration_seconds = timers
            .get(current_index)
            .map(|timer| timer.duration_seconds)
            .unwrap_or(0);
        let queued_after: u64 = timers
            .iter()
            .skip(current_index + 1)
            .map(|timer| timer.duration_seconds)
            .fold(0, u64::saturating_add);
        let display_remaining = match phase {
            Phase::Idle => Duration::from_secs(current_duration_seconds),
            Phase::Running | Phase::Paused => remaining_in_current,
        };

        PlaybackSnapshot {
            phase,
            current_index,
            remaining_in_current,
            current_duration_seconds,
            total_seconds: timers
                .iter()
                .map(|timer| timer.duration_seconds)
                .fold(0, u64::saturating_add),
            total_remaining: remaining_in_current.saturating_add(Duration::from_secs(queued_after)),
            display_remaining,
        }
    }

    fn make_current(&mut self, index: usize, timer: TimerDefinition, now: Instant) -> PlaybackEvent {
        let duration = Duration::from_secs(timer.duration_seconds);
        self.state = PlaybackState::Running {
            index,
            ends_at: deadline(now, duration),
            remaining: duration,
        };
        PlaybackEvent::TimerStarted {
            index,
            id: timer.id,
            duration_seconds: timer.duration_seconds,
        }
    }

    fn go_idle(&mut self) {
        self.state = PlaybackState::Idle;
        self.queue.clear();
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Human label used in notifications, e.g. `Timer 2 (1:30)`
pub fn timer_label(index: usize, duration_seconds: u64) -> String {
    format!("Timer {} ({})", index + 1, format_duration(duration_seconds))
}

/// `start + duration`, pinned to the latest representable instant on overflow
fn deadline(start: Instant, duration: Duration) -> Instant {
    start.checked_add(duration).unwrap_or_else(|| {
        let mut step = duration;
        let mut latest = start;
        while !step.is_zero() {
            match latest.checked_add(step) {
                Some(next) => latest = next,
                None => step /= 2,
            }
        }
        latest
    })
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
