//! Utility functions module
//! 
//! Duration formatting and parsing, plus process signal handling.

pub mod duration;
pub mod signals;

// Re-export main functions
pub use duration::{format_duration, format_secs_f64, parse_components, to_seconds};
pub use signals::shutdown_signal;
