//! View model rendered from a session snapshot

use serde::Serialize;

use crate::{
    state::{Phase, SessionView, TimerDefinition},
    utils::duration::{edit_fields, format_duration, format_secs_f64},
};

/// Everything a client needs to draw the timer screen
#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    pub phase: Phase,
    pub ring: RingView,
    pub total: TotalView,
    pub timers: Vec<TimerItemView>,
    pub controls: ControlsView,
}

/// Progress ring for the current timer
#[derive(Debug, Clone, Serialize)]
pub struct RingView {
    /// Elapsed fraction of the current timer, 0.0 to 1.0
    pub progress: f64,
    pub time: String,
    pub label: String,
    pub animating: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalView {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Active,
    Done,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerItemView {
    pub id: u64,
    /// 1-based playback position
    pub position: usize,
    pub duration_seconds: u64,
    pub display: String,
    pub status: ItemStatus,
    pub edit: EditFields,
}

/// Prefill for the H/M/S edit form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditFields {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsView {
    pub can_start: bool,
    pub can_pause: bool,
    pub pause_label: String,
    pub can_edit: bool,
}

/// Elapsed fraction of a timer, clamped to [0, 1]. Zero when `total` is not positive.
pub fn ring_progress(remaining_secs: f64, total_secs: f64) -> f64 {
    if total_secs <= 0.0 {
        return 0.0;
    }
    ((total_secs - remaining_secs) / total_secs).clamp(0.0, 1.0)
}

/// List status of the timer at `index`
pub fn item_status(index: usize, current_index: usize, phase: Phase) -> ItemStatus {
    if phase == Phase::Idle {
        ItemStatus::Pending
    } else if index < current_index {
        ItemStatus::Done
    } else if index == current_index && phase == Phase::Running {
        ItemStatus::Active
    } else {
        ItemStatus::Pending
    }
}

impl ViewResponse {
    pub fn from_session(session: &SessionView) -> Self {
        let playback = &session.playback;
        let phase = playback.phase;
        let idle = phase == Phase::Idle;

        let ring_label = if !idle {
            format!("Timer {}", playback.current_index + 1)
        } else if session.timers.is_empty() {
            "Add timers below".to_string()
        } else {
            "Ready".to_string()
        };

        let ring = RingView {
            progress: ring_progress(
                playback.display_remaining.as_secs_f64(),
                playback.current_duration_seconds as f64,
            ),
            time: format_secs_f64(playback.display_remaining.as_secs_f64()),
            label: ring_label,
            animating: phase == Phase::Running,
        };

        let total = if idle {
            TotalView {
                label: "Total".to_string(),
                value: format_duration(playback.total_seconds),
            }
        } else {
            TotalView {
                label: "Remaining".to_string(),
                value: format_duration(playback.total_remaining.as_secs_f64().ceil() as u64),
            }
        };

        let timers = session
            .timers
            .iter()
            .enumerate()
            .map(|(index, timer)| item_view(index, timer, playback.current_index, phase))
            .collect();

        let controls = ControlsView {
            can_start: idle && !session.timers.is_empty(),
            can_pause: !idle,
            pause_label: if phase == Phase::Paused { "Resume" } else { "Pause" }.to_string(),
            can_edit: session.can_edit,
        };

        Self {
            phase,
            ring,
            total,
            timers,
            controls,
        }
    }
}

fn item_view(index: usize, timer: &TimerDefinition, current_index: usize, phase: Phase) -> TimerItemView {
    let (hours, minutes, seconds) = edit_fields(timer.duration_seconds);
    TimerItemView {
        id: timer.id,
        position: index + 1,
        duration_seconds: timer.duration_seconds,
        display: format_duration(timer.duration_seconds),
        status: item_status(index, current_index, phase),
        edit: EditFields {
            hours,
            minutes,
            seconds,
        },
    }
}

/// Label shown on a preset button
pub fn preset_label(seconds: u64) -> String {
    if seconds % 60 == 0 {
        format!("{} min", seconds / 60)
    } else {
        format_duration(seconds)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::state::PlaybackSnapshot;

    fn session(timers: &[u64], playback: PlaybackSnapshot) -> SessionView {
        SessionView {
            timers: timers
                .iter()
                .enumerate()
                .map(|(i, &secs)| TimerDefinition {
                    id: i as u64 + 1,
                    duration_seconds: secs,
                })
                .collect(),
            can_edit: playback.phase == Phase::Idle,
            playback,
        }
    }

    fn snapshot(phase: Phase, current_index: usize, current: u64, remaining_ms: u64, total_remaining_ms: u64) -> PlaybackSnapshot {
        PlaybackSnapshot {
            phase,
            current_index,
            remaining_in_current: Duration::from_millis(remaining_ms),
            current_duration_seconds: current,
            total_seconds: 10,
            total_remaining: Duration::from_millis(total_remaining_ms),
            display_remaining: Duration::from_millis(remaining_ms),
        }
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(ring_progress(5.0, 10.0), 0.5);
        assert_eq!(ring_progress(12.0, 10.0), 0.0);
        assert_eq!(ring_progress(-1.0, 10.0), 1.0);
        assert_eq!(ring_progress(3.0, 0.0), 0.0);
    }

    #[test]
    fn statuses_follow_current_index() {
        assert_eq!(item_status(0, 1, Phase::Running), ItemStatus::Done);
        assert_eq!(item_status(1, 1, Phase::Running), ItemStatus::Active);
        assert_eq!(item_status(1, 1, Phase::Paused), ItemStatus::Pending);
        assert_eq!(item_status(2, 1, Phase::Running), ItemStatus::Pending);
        assert_eq!(item_status(0, 0, Phase::Idle), ItemStatus::Pending);
    }

    #[test]
    fn empty_idle_view_prompts_for_timers() {
        let mut playback = snapshot(Phase::Idle, 0, 0, 0, 0);
        playback.total_seconds = 0;
        let view = ViewResponse::from_session(&session(&[], playback));

        assert_eq!(view.ring.label, "Add timers below");
        assert_eq!(view.ring.time, "0:00");
        assert_eq!(view.ring.progress, 0.0);
        assert_eq!(view.total.label, "Total");
        assert_eq!(view.total.value, "0:00");
        assert!(!view.controls.can_start);
        assert!(!view.controls.can_pause);
    }

    #[test]
    fn idle_view_shows_first_timer_and_total() {
        let view = ViewResponse::from_session(&session(&[5, 3, 2], snapshot(Phase::Idle, 0, 5, 5000, 10_000)));

        assert_eq!(view.ring.label, "Ready");
        assert_eq!(view.ring.time, "0:05");
        assert_eq!(view.ring.progress, 0.0);
        assert_eq!(view.total.value, "0:10");
        assert!(view.controls.can_start);
        assert!(view.controls.can_edit);
        assert_eq!(view.timers[2].position, 3);
        assert_eq!(view.timers[2].display, "0:02");
    }

    #[test]
    fn running_view_floors_ring_and_ceils_total() {
        let view = ViewResponse::from_session(&session(&[5, 3, 2], snapshot(Phase::Running, 1, 3, 1500, 3500)));

        assert_eq!(view.ring.label, "Timer 2");
        assert_eq!(view.ring.time, "0:01");
        assert!(view.ring.animating);
        assert_eq!(view.total.label, "Remaining");
        assert_eq!(view.total.value, "0:04");
        assert_eq!(view.timers[0].status, ItemStatus::Done);
        assert_eq!(view.timers[1].status, ItemStatus::Active);
        assert_eq!(view.controls.pause_label, "Pause");
        assert!(!view.controls.can_start);
        assert!(!view.controls.can_edit);
    }

    #[test]
    fn paused_view_offers_resume() {
        let view = ViewResponse::from_session(&session(&[5], snapshot(Phase::Paused, 0, 5, 2000, 2000)));

        assert!(!view.ring.animating);
        assert_eq!(view.controls.pause_label, "Resume");
        assert!(view.controls.can_pause);
    }

    #[test]
    fn preset_labels() {
        assert_eq!(preset_label(60), "1 min");
        assert_eq!(preset_label(900), "15 min");
        assert_eq!(preset_label(90), "1:30");
    }
}
