//! Connectivity status published by the reachability monitor

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last observed, debounced network reachability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl ConnectivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityStatus::Unknown => "unknown",
            ConnectivityStatus::Online => "online",
            ConnectivityStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broadcast whenever the debounced status transitions into `Online`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityRestored {
    /// Status held immediately before the transition
    pub previous: ConnectivityStatus,
    pub at: DateTime<Utc>,
}
