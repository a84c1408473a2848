//! Sequence Timer - Play queued countdown timers one after another
//! 
//! This library provides the timer sequence, the playback state machine that
//! runs through it, and an HTTP control surface with a rendered view model.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
