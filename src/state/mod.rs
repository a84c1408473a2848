//! State management module
//! 
//! This module contains the timer sequence, the playback state machine and
//! the shared application state that ties them to the tick task.

pub mod app_state;
pub mod playback;
pub mod sequence;

// Re-export main types
pub use app_state::{AppState, SessionView, TickStatus};
pub use playback::{Phase, PlaybackEngine, PlaybackEvent, PlaybackSnapshot};
pub use sequence::{TimerDefinition, TimerSequence};
