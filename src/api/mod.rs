//! HTTP API module
//! 
//! Control and status endpoints over the two monitors.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/reachability/refresh", post(refresh_handler))
        .route("/timer/start", post(timer_start_handler))
        .route("/timer/pause", post(timer_pause_handler))
        .route("/timer/resume", post(timer_resume_handler))
        .route("/timer/cancel", post(timer_cancel_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
