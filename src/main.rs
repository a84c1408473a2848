//! Sequence Timer - Play queued countdown timers one after another
//! 
//! This is the main entry point for the sequence-timer server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use sequence_timer::{
    api::create_router,
    config::Config,
    services::{Chime, Notifier, NotifierKind},
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("sequence_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting sequence-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, tick={}ms, presets={:?}",
        config.host, config.port, config.tick_ms, config.presets()
    );

    let notifier_kind = if config.no_notifications {
        NotifierKind::LogOnly
    } else {
        NotifierKind::NotifyRust
    };
    let chime = Chime::detect(!config.silent);
    info!("Alert backend: {:?}", chime.backend());

    // Create application state
    let state = Arc::new(
        AppState::new(
            config.port,
            config.host.clone(),
            config.tick_interval(),
            config.presets(),
        )
        .with_sinks(Arc::new(Notifier::new(notifier_kind)), Arc::new(chime)),
    );

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timers               - Add a timer from hours/minutes/seconds");
    info!("  POST   /timers/preset/:index - Add a preset timer");
    info!("  PUT    /timers/:id           - Edit a timer");
    info!("  DELETE /timers/:id           - Remove a timer");
    info!("  POST   /start /pause /resume /toggle-pause /reset");
    info!("  POST   /window/minimize /window/close");
    info!("  GET    /status /presets /events /health");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
        _ = state.host_shell.closed() => {
            info!("Close requested");
        }
    }

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
