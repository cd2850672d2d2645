//! Media Monitors - background monitors for a media-library client
//! 
//! Two single-writer actors live here: a [`ReachabilityMonitor`] that keeps a
//! debounced, self-healing view of whether the media server is reachable, and
//! a [`CountdownTimer`] that provides a pausable, drift-free sleep timer. The
//! remaining modules wrap them in a small control daemon.

pub mod api;
pub mod config;
pub mod countdown;
pub mod error;
pub mod reachability;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use countdown::{CountdownConfig, CountdownTimer};
pub use error::MonitorError;
pub use reachability::{ReachabilityConfig, ReachabilityMonitor};
pub use state::{AppState, ConnectivityStatus, TimerState};
pub use utils::signals::shutdown_signal;
