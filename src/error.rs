//! Error conditions reported by the monitors
//!
//! None of these escape the public monitor operations. They travel through the
//! log side channel so that a misbehaving caller or platform never takes the
//! process down.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// An operation was requested from a state that does not allow it
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    /// The platform refused to hand out an observer or tick resource
    #[error("resource allocation failed: {0}")]
    ResourceAllocationFailed(String),

    /// The owning actor task has already shut down
    #[error("monitor actor is no longer running")]
    ActorGone,
}

impl MonitorError {
    pub fn invalid(operation: &'static str, state: &'static str) -> Self {
        Self::InvalidTransition { operation, state }
    }
}
