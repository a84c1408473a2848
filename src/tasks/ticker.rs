//! Playback tick task

use std::sync::Arc;
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::state::{AppState, TickStatus};

/// Spawn the tick task for `generation`
pub fn spawn_ticker(state: Arc<AppState>, generation: u64) -> JoinHandle<()> {
    tokio::spawn(playback_ticker_task(state, generation))
}

/// Drive playback forward until the sequence completes or a newer task takes over
pub async fn playback_ticker_task(state: Arc<AppState>, generation: u64) {
    debug!("Starting playback ticker (generation {})", generation);

    let mut ticks = interval(state.tick_interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticks.tick().await;

        match state.tick(generation) {
            Ok(TickStatus::Continue) => {}
            Ok(TickStatus::Finished) => {
                info!("Sequence complete, stopping playback ticker");
                break;
            }
            Ok(TickStatus::Stale) => {
                debug!("Playback ticker generation {} superseded", generation);
                break;
            }
            Err(e) => {
                error!("Failed to advance playback: {}", e);
                break;
            }
        }
    }
}
