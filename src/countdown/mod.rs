//! Pausable, deadline-based countdown
//!
//! [`CountdownMachine`] holds the transition rules and the remaining-time
//! arithmetic. [`CountdownTimer`] runs the machine inside a single-writer
//! actor fed by a [`TickSource`].

pub mod machine;
pub mod tick;
pub mod timer;

pub use machine::{CountdownMachine, TickOutcome};
pub use tick::{TickEvent, TickHandle, TickSource, TokioTickSource};
pub use timer::{CompleteCallback, CountdownConfig, CountdownTimer, TickCallback};
