//! Countdown timer state and the snapshot published to readers

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Lifecycle of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Completed => "completed",
        }
    }

    /// `start()` is only accepted from these states
    pub fn can_start(&self) -> bool {
        matches!(self, TimerState::Idle | TimerState::Completed)
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a countdown, published after every committed change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerSnapshot {
    pub state: TimerState,
    /// Remaining time as of the last committed change
    pub remaining: Duration,
    /// Absolute end time, present only while running
    pub deadline: Option<Instant>,
}

impl TimerSnapshot {
    /// Remaining time measured against `now`.
    ///
    /// While running this is derived from the deadline, so it stays accurate
    /// between ticks. In every other state the stored value is returned as is.
    pub fn remaining_at(&self, now: Instant) -> Duration {
        match (self.state, self.deadline) {
            (TimerState::Running, Some(deadline)) => deadline.saturating_duration_since(now),
            _ => self.remaining,
        }
    }
}
