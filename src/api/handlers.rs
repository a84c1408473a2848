//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::{stream, Stream};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::state::AppState;
use super::{
    responses::{ApiResponse, HealthResponse, PresetResponse, StatusResponse},
    view::ViewResponse,
};

type ApiResult = Result<Json<ApiResponse>, StatusCode>;

/// H/M/S text fields as typed into the add or edit form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DurationFields {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

fn current_view(state: &AppState) -> Result<ViewResponse, StatusCode> {
    state
        .view()
        .map(|session| ViewResponse::from_session(&session))
        .map_err(|e| {
            error!("Failed to read session: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

/// Answer an intent with the view after it was applied or ignored
fn respond(
    state: &AppState,
    outcome: Result<bool, String>,
    applied: &str,
    ignored: &str,
) -> ApiResult {
    match outcome {
        Ok(true) => Ok(Json(ApiResponse::applied(applied.to_string(), current_view(state)?))),
        Ok(false) => Ok(Json(ApiResponse::ignored(ignored.to_string(), current_view(state)?))),
        Err(e) => {
            error!("Failed to apply intent: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn respond_added(state: &AppState, outcome: Result<Option<u64>, String>) -> ApiResult {
    match outcome {
        Ok(Some(id)) => {
            info!("Timer {} added via API", id);
            let response = ApiResponse::applied("Timer added".to_string(), current_view(state)?);
            Ok(Json(response.with_id(Some(id))))
        }
        Ok(None) => Ok(Json(ApiResponse::ignored(
            "Timer not added".to_string(),
            current_view(state)?,
        ))),
        Err(e) => {
            error!("Failed to add timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timers - Queue a timer from H/M/S fields
pub async fn add_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<DurationFields>,
) -> ApiResult {
    let outcome = state.add_custom_timer(&fields.hours, &fields.minutes, &fields.seconds);
    respond_added(&state, outcome)
}

/// Handle POST /timers/preset/:index - Queue a preset duration
pub async fn add_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> ApiResult {
    let Some(seconds) = state.preset(index) else {
        warn!("Unknown preset index {}", index);
        return Err(StatusCode::NOT_FOUND);
    };
    respond_added(&state, state.add_timer(seconds))
}

/// Handle PUT /timers/:id - Change a queued timer's duration
pub async fn edit_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(fields): Json<DurationFields>,
) -> ApiResult {
    let outcome = state.edit_custom_timer(id, &fields.hours, &fields.minutes, &fields.seconds);
    respond(&state, outcome, "Timer updated", "Timer not updated")
}

/// Handle DELETE /timers/:id - Remove a queued timer
pub async fn remove_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult {
    respond(&state, state.remove_timer(id), "Timer removed", "Timer not removed")
}

/// Handle POST /start - Begin playing the sequence
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond(&state, state.start(), "Playback started", "Nothing to start")
}

/// Handle POST /pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond(&state, state.pause(), "Playback paused", "Nothing to pause")
}

/// Handle POST /resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond(&state, state.resume(), "Playback resumed", "Nothing to resume")
}

/// Handle POST /toggle-pause - Pause when running, resume when paused
pub async fn toggle_pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond(
        &state,
        state.toggle_pause(),
        "Playback toggled",
        "Nothing to pause or resume",
    )
}

/// Handle POST /reset - Stop playback and return to the first timer
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond(&state, state.reset(), "Playback reset", "Already idle")
}

/// Handle POST /window/minimize
pub async fn minimize_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    state.host_shell.request_minimize();
    Ok(Json(ApiResponse::applied(
        "Minimize requested".to_string(),
        current_view(&state)?,
    )))
}

/// Handle POST /window/close - Ask the server to shut down
pub async fn close_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let view = current_view(&state)?;
    state.host_shell.request_close();
    Ok(Json(ApiResponse::applied("Close requested".to_string(), view)))
}

/// Handle GET /status - Full view model and server metadata
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let view = current_view(&state)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        view,
        ticking: state.is_ticking(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /presets
pub async fn presets_handler(State(state): State<Arc<AppState>>) -> Json<Vec<PresetResponse>> {
    Json(
        state
            .presets()
            .iter()
            .enumerate()
            .map(|(index, &seconds)| PresetResponse::new(index, seconds))
            .collect(),
    )
}

/// Handle GET /events - Stream playback events as they happen
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_tx.subscribe();

    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().json_data(&event) {
                    Ok(sse_event) => return Some((Ok(sse_event), rx)),
                    Err(e) => warn!("Failed to encode playback event: {}", e),
                },
                Err(RecvError::Lagged(missed)) => {
                    warn!("Event subscriber lagged, {} events dropped", missed);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
