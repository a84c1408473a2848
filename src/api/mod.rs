//! HTTP API module
//! 
//! This module contains the endpoint handlers, the view model and the
//! response structures of the control surface.

pub mod handlers;
pub mod responses;
pub mod view;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", post(add_timer_handler))
        .route("/timers/preset/:index", post(add_preset_handler))
        .route("/timers/:id", put(edit_timer_handler).delete(remove_timer_handler))
        .route("/start", post(start_handler))
        .route("/pause", post(pause_handler))
        .route("/resume", post(resume_handler))
        .route("/toggle-pause", post(toggle_pause_handler))
        .route("/reset", post(reset_handler))
        .route("/window/minimize", post(minimize_handler))
        .route("/window/close", post(close_handler))
        .route("/presets", get(presets_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
