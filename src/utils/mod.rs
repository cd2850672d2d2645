//! Utility functions module
//! 
//! Process-level helpers used by the daemon.

pub mod signals;

// Re-export main functions
pub use signals::shutdown_signal;
