//! Main application state management

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::{sync::broadcast, task::JoinHandle, time::Instant};
use tracing::{debug, info, warn};

use super::{
    playback::{PlaybackEngine, PlaybackEvent, PlaybackSnapshot},
    sequence::{TimerDefinition, TimerSequence},
};
use crate::{
    services::{AlertSink, Chime, ChimeBackend, HostShell, NotificationSink, Notifier, NotifierKind},
    tasks::spawn_ticker,
    utils::duration::to_seconds,
};

/// Sequence and engine are only ever changed together
#[derive(Debug, Default)]
struct Session {
    sequence: TimerSequence,
    engine: PlaybackEngine,
}

/// What the tick task should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Continue,
    /// The last timer finished
    Finished,
    /// A newer tick task has replaced this one
    Stale,
}

/// Consistent copy of everything the presentation layer renders
#[derive(Debug, Clone)]
pub struct SessionView {
    pub timers: Vec<TimerDefinition>,
    pub playback: PlaybackSnapshot,
    pub can_edit: bool,
}

/// Shared application state: the timer sequence, the playback engine and the
/// single tick task driving it
pub struct AppState {
    session: Mutex<Session>,
    /// Handle of the only tick task allowed to exist
    ticker: Mutex<Option<JoinHandle<()>>>,
    /// Bumped whenever the tick task is replaced or torn down
    generation: AtomicU64,
    pub tick_interval: Duration,
    presets: Vec<u64>,
    notifier: Arc<dyn NotificationSink>,
    alert: Arc<dyn AlertSink>,
    pub host_shell: HostShell,
    /// Channel for playback event subscribers
    pub event_tx: broadcast::Sender<PlaybackEvent>,
    /// Server metadata
    pub start_time: std::time::Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    /// Create a new AppState that logs notifications and plays no sound
    pub fn new(port: u16, host: String, tick_interval: Duration, presets: Vec<u64>) -> Self {
        let (event_tx, _) = broadcast::channel(64);

        Self {
            session: Mutex::new(Session::default()),
            ticker: Mutex::new(None),
            generation: AtomicU64::new(0),
            tick_interval,
            presets,
            notifier: Arc::new(Notifier::new(NotifierKind::LogOnly)),
            alert: Arc::new(Chime::with_backend(ChimeBackend::Silent)),
            host_shell: HostShell::new(),
            event_tx,
            start_time: std::time::Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
        }
    }

    /// Replace the notification and alert sinks
    pub fn with_sinks(
        mut self,
        notifier: Arc<dyn NotificationSink>,
        alert: Arc<dyn AlertSink>,
    ) -> Self {
        self.notifier = notifier;
        self.alert = alert;
        self
    }

    fn lock_session(&self) -> Result<MutexGuard<'_, Session>, String> {
        self.session
            .lock()
            .map_err(|e| format!("Failed to lock session: {}", e))
    }

    // ── Sequence store ───────────────────────────────────────────────

    /// Queue a timer. Returns the new id, or `None` when the add was ignored.
    pub fn add_timer(&self, duration_seconds: u64) -> Result<Option<u64>, String> {
        let id = self.lock_session()?.sequence.add(duration_seconds);
        match id {
            Some(id) => {
                info!("Added timer {} ({}s)", id, duration_seconds);
                self.record_action("add");
            }
            None => debug!("Add of {}s timer ignored", duration_seconds),
        }
        Ok(id)
    }

    /// Queue a timer from H/M/S text fields
    pub fn add_custom_timer(
        &self,
        hours: &str,
        minutes: &str,
        seconds: &str,
    ) -> Result<Option<u64>, String> {
        self.add_timer(to_seconds(hours, minutes, seconds))
    }

    /// Replace the duration of a queued timer. Returns whether it changed.
    pub fn edit_timer(&self, id: u64, duration_seconds: u64) -> Result<bool, String> {
        let edited = self.lock_session()?.sequence.edit(id, duration_seconds);
        if edited {
            info!("Edited timer {} to {}s", id, duration_seconds);
            self.record_action("edit");
        }
        Ok(edited)
    }

    /// Replace the duration of a queued timer from H/M/S text fields
    pub fn edit_custom_timer(
        &self,
        id: u64,
        hours: &str,
        minutes: &str,
        seconds: &str,
    ) -> Result<bool, String> {
        self.edit_timer(id, to_seconds(hours, minutes, seconds))
    }

    /// Remove a queued timer. Returns whether anything was removed.
    pub fn remove_timer(&self, id: u64) -> Result<bool, String> {
        let removed = self.lock_session()?.sequence.remove(id);
        if removed {
            info!("Removed timer {}", id);
            self.record_action("remove");
        }
        Ok(removed)
    }

    pub fn presets(&self) -> &[u64] {
        &self.presets
    }

    /// Preset duration at `index`
    pub fn preset(&self, index: usize) -> Option<u64> {
        self.presets.get(index).copied()
    }

    // ── Playback ─────────────────────────────────────────────────────

    /// Start playback and (re)establish the tick task.
    /// Returns `false` when the sequence is empty or already playing.
    pub fn start(self: &Arc<Self>) -> Result<bool, String> {
        let event = {
            let mut session = self.lock_session()?;
            let Session { sequence, engine } = &mut *session;
            let Some(event) = engine.start(sequence.timers(), Instant::now()) else {
                debug!("Start ignored");
                return Ok(false);
            };
            sequence.lock();

            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.replace_ticker(Some(spawn_ticker(Arc::clone(self), generation)))?;
            info!("Playback started with {} timer(s)", sequence.len());
            event
        };

        self.record_action("start");
        self.dispatch(&[event]);
        Ok(true)
    }

    /// Advance playback on behalf of the tick task spawned with `generation`
    pub fn tick(&self, generation: u64) -> Result<TickStatus, String> {
        let outcome = {
            let mut session = self.lock_session()?;
            if self.generation.load(Ordering::SeqCst) != generation {
                return Ok(TickStatus::Stale);
            }
            let outcome = session.engine.tick(Instant::now());
            if outcome.finished {
                session.sequence.unlock();
            }
            outcome
        };

        self.dispatch(&outcome.events);
        if outcome.finished {
            info!("All timers finished");
            Ok(TickStatus::Finished)
        } else {
            Ok(TickStatus::Continue)
        }
    }

    pub fn pause(&self) -> Result<bool, String> {
        let event = self.lock_session()?.engine.pause(Instant::now());
        Ok(self.finish_intent("pause", event))
    }

    pub fn resume(&self) -> Result<bool, String> {
        let event = self.lock_session()?.engine.resume(Instant::now());
        Ok(self.finish_intent("resume", event))
    }

    pub fn toggle_pause(&self) -> Result<bool, String> {
        let event = self.lock_session()?.engine.toggle_pause(Instant::now());
        Ok(self.finish_intent("toggle-pause", event))
    }

    /// Stop playback and tear down the tick task.
    /// Returns whether playback was active.
    pub fn reset(&self) -> Result<bool, String> {
        let event = {
            let mut session = self.lock_session()?;
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.replace_ticker(None)?;
            session.sequence.unlock();
            session.engine.reset()
        };
        Ok(self.finish_intent("reset", event))
    }

    /// Whether a tick task is currently alive
    pub fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .map(|ticker| ticker.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    /// Abort the tick task on the way out
    pub fn shutdown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.replace_ticker(None) {
            warn!("Failed to stop ticker during shutdown: {}", e);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Snapshot of sequence and playback taken under a single lock
    pub fn view(&self) -> Result<SessionView, String> {
        let session = self.lock_session()?;
        Ok(SessionView {
            timers: session.sequence.timers().to_vec(),
            playback: session.engine.snapshot(session.sequence.timers()),
            can_edit: session.sequence.can_edit(),
        })
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|last| last.clone()) {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn replace_ticker(&self, next: Option<JoinHandle<()>>) -> Result<(), String> {
        let mut ticker = self
            .ticker
            .lock()
            .map_err(|e| format!("Failed to lock ticker: {}", e))?;
        if let Some(stale) = ticker.take() {
            stale.abort();
        }
        *ticker = next;
        Ok(())
    }

    fn finish_intent(&self, action: &str, event: Option<PlaybackEvent>) -> bool {
        match event {
            Some(event) => {
                info!("Playback {}", action);
                self.record_action(action);
                self.dispatch(&[event]);
                true
            }
            None => {
                debug!("Playback {} ignored", action);
                false
            }
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), Utc::now()));
        }
    }

    /// Hand events to the sinks and subscribers. Must be called without the
    /// session lock held.
    fn dispatch(&self, events: &[PlaybackEvent]) {
        for event in events {
            match event {
                PlaybackEvent::TimerFinished { label, .. } => {
                    self.alert_user("Timer done", &format!("{} finished.", label));
                }
                PlaybackEvent::AllDone => {
                    self.alert_user("All done", "All timers have finished.");
                }
                _ => {}
            }

            if self.event_tx.send(event.clone()).is_err() {
                debug!("No event subscribers for {:?}", event);
            }
        }
    }

    fn alert_user(&self, title: &str, body: &str) {
        info!("{}: {}", title, body);
        self.notifier.notify(title, body);
        self.alert.play_alert();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        notifications: Mutex<Vec<(String, String)>>,
        alerts: Mutex<usize>,
    }

    impl NotificationSink for Recorder {
        fn notify(&self, title: &str, body: &str) {
            self.notifications
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
        }
    }

    impl AlertSink for Recorder {
        fn play_alert(&self) {
            *self.alerts.lock().unwrap() += 1;
        }
    }

    fn state_with_recorder() -> (Arc<AppState>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let state = AppState::new(0, "127.0.0.1".to_string(), Duration::from_millis(80), vec![60])
            .with_sinks(recorder.clone(), recorder.clone());
        (Arc::new(state), recorder)
    }

    #[tokio::test]
    async fn start_on_empty_sequence_has_no_side_effects() {
        let (state, recorder) = state_with_recorder();
        let mut events = state.event_tx.subscribe();

        assert!(!state.start().unwrap());
        assert!(!state.is_ticking());
        assert!(state.view().unwrap().can_edit);
        assert!(recorder.notifications.lock().unwrap().is_empty());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn plays_queued_timers_in_order() {
        let (state, recorder) = state_with_recorder();
        for secs in [5, 3, 2] {
            state.add_timer(secs).unwrap();
        }

        assert!(state.start().unwrap());
        assert!(state.is_ticking());
        tokio::time::sleep(Duration::from_secs(12)).await;

        let notifications = recorder.notifications.lock().unwrap().clone();
        assert_eq!(
            notifications,
            vec![
                ("Timer done".to_string(), "Timer 1 (0:05) finished.".to_string()),
                ("Timer done".to_string(), "Timer 2 (0:03) finished.".to_string()),
                ("Timer done".to_string(), "Timer 3 (0:02) finished.".to_string()),
                ("All done".to_string(), "All timers have finished.".to_string()),
            ]
        );
        assert_eq!(*recorder.alerts.lock().unwrap(), 4);

        let view = state.view().unwrap();
        assert_eq!(view.playback.current_index, 0);
        assert!(view.can_edit);
        assert!(!state.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_ticking() {
        let (state, recorder) = state_with_recorder();
        state.add_timer(2).unwrap();
        state.start().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(state.reset().unwrap());
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(recorder.notifications.lock().unwrap().is_empty());
        assert!(!state.is_ticking());
        assert!(!state.reset().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_remaining_time() {
        let (state, recorder) = state_with_recorder();
        state.add_timer(2).unwrap();
        state.start().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(state.pause().unwrap());
        let before = state.view().unwrap().playback.total_remaining;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(recorder.notifications.lock().unwrap().is_empty());
        assert!(state.is_ticking());

        assert!(state.resume().unwrap());
        assert_eq!(state.view().unwrap().playback.total_remaining, before);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(recorder.notifications.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn sequence_is_frozen_while_playing() {
        let (state, _) = state_with_recorder();
        let id = state.add_timer(30).unwrap().unwrap();
        state.start().unwrap();

        assert_eq!(state.add_timer(10).unwrap(), None);
        assert!(!state.edit_timer(id, 10).unwrap());
        assert!(!state.remove_timer(id).unwrap());
        let view = state.view().unwrap();
        assert_eq!(view.timers.len(), 1);
        assert_eq!(view.timers[0].duration_seconds, 30);
        assert!(!view.can_edit);

        state.reset().unwrap();
        assert!(state.edit_timer(id, 10).unwrap());
    }

    #[tokio::test]
    async fn stale_generation_is_rejected() {
        let (state, _) = state_with_recorder();
        state.add_timer(30).unwrap();
        state.start().unwrap();
        let current = state.generation.load(Ordering::SeqCst);

        assert_eq!(state.tick(current - 1).unwrap(), TickStatus::Stale);
        assert_eq!(state.tick(current).unwrap(), TickStatus::Continue);

        state.reset().unwrap();
        assert_eq!(state.tick(current).unwrap(), TickStatus::Stale);
    }

    #[tokio::test]
    async fn double_start_keeps_single_ticker() {
        let (state, _) = state_with_recorder();
        state.add_timer(30).unwrap();
        assert!(state.start().unwrap());
        let generation = state.generation.load(Ordering::SeqCst);

        assert!(!state.start().unwrap());
        assert_eq!(state.generation.load(Ordering::SeqCst), generation);
        assert!(state.is_ticking());
        state.shutdown();
    }

    #[tokio::test]
    async fn overlong_custom_timer_is_ignored() {
        let (state, _) = state_with_recorder();
        assert_eq!(
            state.add_custom_timer("99999999999999999999", "", "").unwrap(),
            None
        );
        assert!(!state.start().unwrap());

        let id = state.add_custom_timer("876000", "", "").unwrap().unwrap();
        state.add_custom_timer("876000", "", "").unwrap().unwrap();
        assert!(!state.edit_custom_timer(id, "99999999999999999999", "", "").unwrap());
        assert_eq!(state.view().unwrap().playback.total_seconds, 2 * 876_000 * 3600);

        assert!(state.start().unwrap());
        assert!(state.view().is_ok());
        assert!(state.reset().unwrap());
    }

    #[tokio::test]
    async fn custom_fields_are_coerced() {
        let (state, _) = state_with_recorder();
        assert_eq!(state.add_custom_timer("", "", "").unwrap(), None);
        let id = state.add_custom_timer("", "2", "x").unwrap().unwrap();
        assert!(state.edit_custom_timer(id, "1", "", "99").unwrap());
        assert_eq!(state.view().unwrap().timers[0].duration_seconds, 3659);
        assert_eq!(state.preset(0), Some(60));
        assert_eq!(state.preset(1), None);
    }

    #[tokio::test]
    async fn events_reach_subscribers() {
        let (state, _) = state_with_recorder();
        let mut events = state.event_tx.subscribe();
        state.add_timer(30).unwrap();
        state.start().unwrap();
        state.pause().unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            PlaybackEvent::TimerStarted { index: 0, .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            PlaybackEvent::Paused { index: 0, .. }
        ));
        state.shutdown();
    }
}
