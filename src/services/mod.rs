//! External collaborators module
//! 
//! Desktop notifications, the audible chime and the host shell that receives
//! window intents. Every sink here is fire-and-forget: failures are logged and
//! never reach the playback engine.

pub mod chime;
pub mod host;
pub mod notifier;

// Re-export main types
pub use chime::{Chime, ChimeBackend};
pub use host::HostShell;
pub use notifier::{Notifier, NotifierKind};

/// Receives "timer finished" and "all done" notifications
pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Plays a short audible alert
pub trait AlertSink: Send + Sync {
    fn play_alert(&self);
}
