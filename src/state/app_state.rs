//! Shared daemon state

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{ConnectivityRestored, ConnectivityStatus, TimerState};
use crate::{
    config::Config,
    countdown::CountdownTimer,
    reachability::{ProbeObserverFactory, ReachabilityMonitor},
};

/// State shared by the HTTP handlers and background tasks
#[derive(Debug)]
pub struct AppState {
    /// Reachability of the media server
    pub monitor: ReachabilityMonitor,
    /// Sleep timer
    pub timer: CountdownTimer,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    pub server: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// When connectivity was last restored
    pub last_restored: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Build the monitors from configuration. Must run inside a tokio runtime.
    pub fn new(config: &Config) -> Self {
        let factory = ProbeObserverFactory::new(
            config.server.clone(),
            config.probe_interval(),
            config.probe_timeout(),
        );

        Self::with_components(
            config,
            ReachabilityMonitor::new(Arc::new(factory), config.reachability()),
            CountdownTimer::new(config.countdown()),
        )
    }

    /// Assemble state around already constructed monitors
    pub fn with_components(
        config: &Config,
        monitor: ReachabilityMonitor,
        timer: CountdownTimer,
    ) -> Self {
        Self {
            monitor,
            timer,
            start_time: Instant::now(),
            port: config.port,
            host: config.host.clone(),
            server: config.server.clone(),
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            last_restored: Mutex::new(None),
        }
    }

    /// Register the daemon's own monitor callbacks and begin observing
    pub async fn start_monitors(&self) {
        self.monitor
            .on_status_change(|status| match status {
                ConnectivityStatus::Online => info!("Media server reachable"),
                ConnectivityStatus::Offline => info!("Media server unreachable"),
                ConnectivityStatus::Unknown => info!("Media server reachability unknown"),
            })
            .await;

        self.timer
            .set_callbacks(
                |remaining| debug!("Sleep timer: {}s left", remaining.as_secs()),
                || info!("Sleep timer elapsed, playback should stop"),
            )
            .await;

        self.monitor.start().await;
    }

    /// Stop observing and cancel any countdown
    pub async fn shutdown(&self) {
        self.monitor.stop().await;
        self.timer.cancel().await;
    }

    /// Record the most recent client action
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Remember a "connectivity restored" event
    pub fn record_restored(&self, event: &ConnectivityRestored) {
        if let Ok(mut last_restored) = self.last_restored.lock() {
            *last_restored = Some(event.at);
        }
    }

    pub fn get_last_restored(&self) -> Option<DateTime<Utc>> {
        self.last_restored.lock().ok().and_then(|t| *t)
    }

    pub fn connectivity(&self) -> ConnectivityStatus {
        self.monitor.current_status()
    }

    /// Timer state and remaining whole seconds (rounded up while counting)
    pub fn timer_view(&self) -> (TimerState, u64) {
        let state = self.timer.state();
        let remaining = self.timer.remaining();
        let mut seconds = remaining.as_secs();
        if remaining.subsec_nanos() > 0 {
            seconds += 1;
        }
        (state, seconds)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;
        
        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
