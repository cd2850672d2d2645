//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{AppState, ConnectivityStatus, TimerState};

/// Body of POST /timer/start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartTimerRequest {
    pub seconds: u64,
}

/// Timer portion of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerView {
    pub state: TimerState,
    pub remaining_seconds: u64,
}

/// API response structure for control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub connectivity: ConnectivityStatus,
    pub timer: TimerView,
}

impl ApiResponse {
    /// Capture the current monitor state alongside a message
    pub fn from_state(message: impl Into<String>, state: &AppState) -> Self {
        let (timer_state, remaining_seconds) = state.timer_view();
        Self {
            message: message.into(),
            timestamp: Utc::now(),
            connectivity: state.connectivity(),
            timer: TimerView {
                state: timer_state,
                remaining_seconds,
            },
        }
    }
}

/// Full status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub connectivity: ConnectivityStatus,
    pub last_restored: Option<DateTime<Utc>>,
    pub timer: TimerView,
    pub server: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
