//! Connectivity-restored listener task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::AppState;

/// Background task that records every "connectivity restored" broadcast
pub async fn connectivity_restored_task(state: Arc<AppState>) {
    info!("Starting connectivity restored task");

    let mut restored_rx = state.monitor.subscribe_restored();

    loop {
        match restored_rx.recv().await {
            Ok(event) => {
                info!("Connectivity restored (was {}) at {}", event.previous, event.at);
                state.record_restored(&event);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Connectivity restored listener lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Reachability monitor gone, stopping connectivity restored task");
                break;
            }
        }
    }
}
