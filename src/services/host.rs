//! Window control intents from the front end

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;
use tracing::info;

/// Receives minimize/close intents.
///
/// There is no native window; a close intent shuts the process down gracefully
/// and a minimize intent is only acknowledged.
#[derive(Debug, Default)]
pub struct HostShell {
    close_requested: AtomicBool,
    close: Notify,
}

impl HostShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_minimize(&self) {
        info!("Minimize requested, no native window to minimize");
    }

    pub fn request_close(&self) {
        info!("Close requested, shutting down");
        self.close_requested.store(true, Ordering::SeqCst);
        self.close.notify_one();
    }

    pub fn is_close_requested(&self) -> bool {
        self.close_requested.load(Ordering::SeqCst)
    }

    /// Resolves once a close intent has been received
    pub async fn closed(&self) {
        if self.is_close_requested() {
            return;
        }
        self.close.notified().await;
    }
}
