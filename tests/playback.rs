use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use sequence_timer::{
    services::{AlertSink, NotificationSink},
    state::{Phase, PlaybackEvent},
    AppState,
};

#[derive(Default)]
struct RecordingSink {
    notifications: Mutex<Vec<String>>,
    alerts: Mutex<u32>,
}

impl NotificationSink for RecordingSink {
    fn notify(&self, title: &str, body: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push(format!("{title}: {body}"));
    }
}

impl AlertSink for RecordingSink {
    fn play_alert(&self) {
        *self.alerts.lock().unwrap() += 1;
    }
}

fn setup() -> (Arc<AppState>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let state = AppState::new(0, "127.0.0.1".to_string(), Duration::from_millis(80), vec![])
        .with_sinks(sink.clone(), sink.clone());
    (Arc::new(state), sink)
}

#[tokio::test(start_paused = true)]
async fn sequence_emits_events_in_order() {
    let (state, sink) = setup();
    let mut events = state.event_tx.subscribe();
    for secs in [5, 3, 2] {
        state.add_timer(secs).unwrap();
    }

    state.start().unwrap();
    tokio::time::sleep(Duration::from_secs(11)).await;

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    let finished: Vec<usize> = received
        .iter()
        .filter_map(|event| match event {
            PlaybackEvent::TimerFinished { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(finished, vec![0, 1, 2]);
    assert_eq!(
        received
            .iter()
            .filter(|event| **event == PlaybackEvent::AllDone)
            .count(),
        1
    );
    assert_eq!(received.last(), Some(&PlaybackEvent::AllDone));

    assert_eq!(sink.notifications.lock().unwrap().len(), 4);
    assert_eq!(*sink.alerts.lock().unwrap(), 4);

    let view = state.view().unwrap();
    assert_eq!(view.playback.phase, Phase::Idle);
    assert_eq!(view.playback.current_index, 0);
    assert!(!state.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn restart_after_reset_runs_once() {
    let (state, sink) = setup();
    state.add_timer(2).unwrap();

    state.start().unwrap();
    tokio::time::sleep(Duration::from_millis(900)).await;
    state.reset().unwrap();
    state.start().unwrap();
    assert!(state.is_ticking());

    tokio::time::sleep(Duration::from_secs(5)).await;

    let notifications = sink.notifications.lock().unwrap().clone();
    assert_eq!(
        notifications,
        vec![
            "Timer done: Timer 1 (0:02) finished.".to_string(),
            "All done: All timers have finished.".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn paused_sequence_does_not_advance() {
    let (state, sink) = setup();
    state.add_timer(1).unwrap();
    state.add_timer(1).unwrap();

    state.start().unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    state.toggle_pause().unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(sink.notifications.lock().unwrap().is_empty());
    assert_eq!(state.view().unwrap().playback.phase, Phase::Paused);

    state.toggle_pause().unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(sink.notifications.lock().unwrap().len(), 3);
}
