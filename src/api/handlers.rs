//! HTTP endpoint handlers

use std::{sync::Arc, time::Duration};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::state::{AppState, TimerState};
use super::responses::{ApiResponse, HealthResponse, StartTimerRequest, StatusResponse, TimerView};

/// Handle POST /reachability/refresh - Restart the offline streak clock
pub async fn refresh_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    state.monitor.force_refresh().await;
    state.record_action("reachability-refresh");
    info!("Refresh endpoint called - reachability watchdog re-armed");
    Json(ApiResponse::from_state("Reachability refresh requested", &state))
}

/// Handle POST /timer/start - Start the sleep timer
pub async fn timer_start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartTimerRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    if request.seconds == 0 {
        warn!("Rejecting sleep timer start with zero duration");
        return Err(StatusCode::BAD_REQUEST);
    }

    let before = state.timer.state();
    state.timer.start(Duration::from_secs(request.seconds)).await;
    state.record_action("timer-start");

    if before.can_start() && state.timer.state() != TimerState::Running {
        warn!("Sleep timer rejected a {}s duration", request.seconds);
        return Err(StatusCode::BAD_REQUEST);
    }

    let message = if before.can_start() {
        info!("Timer start endpoint called - {}s sleep timer running", request.seconds);
        format!("Sleep timer started for {}s", request.seconds)
    } else {
        format!("Sleep timer already {}", before)
    };
    Ok(Json(ApiResponse::from_state(message, &state)))
}

/// Handle POST /timer/pause - Pause the sleep timer
pub async fn timer_pause_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    transition(&state, PauseOrResume::Pause).await
}

/// Handle POST /timer/resume - Resume a paused sleep timer
pub async fn timer_resume_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    transition(&state, PauseOrResume::Resume).await
}

/// Handle POST /timer/cancel - Cancel the sleep timer
pub async fn timer_cancel_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    state.timer.cancel().await;
    state.record_action("timer-cancel");
    info!("Timer cancel endpoint called - sleep timer idle");
    Json(ApiResponse::from_state("Sleep timer cancelled", &state))
}

#[derive(Debug, Clone, Copy)]
enum PauseOrResume {
    Pause,
    Resume,
}

/// Apply a pause or resume and report whether it took effect
async fn transition(state: &AppState, request: PauseOrResume) -> Json<ApiResponse> {
    let before = state.timer.state();
    let (action, required) = match request {
        PauseOrResume::Pause => {
            state.timer.pause().await;
            ("timer-pause", TimerState::Running)
        }
        PauseOrResume::Resume => {
            state.timer.resume().await;
            ("timer-resume", TimerState::Paused)
        }
    };
    state.record_action(action);

    let message = if before == required {
        info!("{} applied", action);
        format!("{} applied", action)
    } else {
        format!("{} ignored while {}", action, before)
    };
    Json(ApiResponse::from_state(message, state))
}

/// Handle GET /status - Return current monitor status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (timer_state, remaining_seconds) = state.timer_view();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        connectivity: state.connectivity(),
        last_restored: state.get_last_restored(),
        timer: TimerView {
            state: timer_state,
            remaining_seconds,
        },
        server: state.server.clone(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
