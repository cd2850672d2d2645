//! Media Monitors - control daemon
//! 
//! Runs the reachability monitor against the configured media server and
//! exposes the sleep timer over HTTP.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use media_monitors::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::connectivity_restored_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("media_monitors={},tower_http=info", config.log_level()))
        .init();

    info!("Starting media-monitors v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, server={}, watchdog={}ms",
          config.host, config.port, config.server, config.watchdog_ms);

    let state = Arc::new(AppState::new(&config));

    // Listen for connectivity restored broadcasts before observation begins
    let restored_state = Arc::clone(&state);
    tokio::spawn(async move {
        connectivity_restored_task(restored_state).await;
    });

    state.start_monitors().await;

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;
    
    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /reachability/refresh - Re-arm the reachability watchdog");
    info!("  POST /timer/start          - Start the sleep timer ({{\"seconds\": n}})");
    info!("  POST /timer/pause          - Pause the sleep timer");
    info!("  POST /timer/resume         - Resume the sleep timer");
    info!("  POST /timer/cancel         - Cancel the sleep timer");
    info!("  GET  /status               - Connectivity and timer status");
    info!("  GET  /health               - Health check");

    let server = axum::serve(listener, app);
    
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            match signal {
                Ok(signal) => info!("Shutdown signal {} received", signal),
                Err(e) => tracing::error!("Signal handler failed: {}", e),
            }
        }
    }

    state.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}
