//! Desktop notification delivery

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::NotificationSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    NotifyRust,
    LogOnly,
}

/// Shows notifications through the desktop notification service.
///
/// Starts optimistic; the first delivery failure downgrades it to logging
/// notifications instead.
#[derive(Debug)]
pub struct Notifier {
    kind: NotifierKind,
    app_name: String,
    downgraded: Arc<AtomicBool>,
}

impl Notifier {
    pub fn new(kind: NotifierKind) -> Self {
        debug!(?kind, "Notifier created");
        Self {
            kind,
            app_name: "Sequence Timer".to_string(),
            downgraded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Effective backend, taking a previous downgrade into account
    pub fn kind(&self) -> NotifierKind {
        if self.downgraded.load(Ordering::Relaxed) {
            NotifierKind::LogOnly
        } else {
            self.kind
        }
    }
}

impl NotificationSink for Notifier {
    fn notify(&self, title: &str, body: &str) {
        if self.kind() == NotifierKind::LogOnly {
            info!("[NOTIFY] {}: {}", title, body);
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            info!("[NOTIFY] {}: {}", title, body);
            return;
        };

        let app_name = self.app_name.clone();
        let title = title.to_string();
        let body = body.to_string();
        let downgraded = Arc::clone(&self.downgraded);
        // D-Bus delivery blocks, keep it off the tick task
        runtime.spawn_blocking(move || {
            let result = notify_rust::Notification::new()
                .appname(&app_name)
                .summary(&title)
                .body(&body)
                .icon("alarm-clock")
                .show();
            match result {
                Ok(_) => debug!(title = %title, "Notification shown"),
                Err(e) => {
                    warn!(error = %e, "notify-rust failed; downgrading to log-only notifier");
                    downgraded.store(true, Ordering::Relaxed);
                    info!("[NOTIFY] {}: {}", title, body);
                }
            }
        });
    }
}
