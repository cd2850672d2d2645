//! Background tasks module
//! 
//! Tasks that run alongside the HTTP server and consume monitor broadcasts.

pub mod connectivity_restored;

// Re-export main functions
pub use connectivity_restored::connectivity_restored_task;
