//! State management module
//! 
//! Status types published by the monitors and the shared daemon state.

pub mod app_state;
pub mod connectivity_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use connectivity_state::{ConnectivityRestored, ConnectivityStatus};
pub use timer_state::{TimerSnapshot, TimerState};
