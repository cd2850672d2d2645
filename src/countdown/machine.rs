//! Countdown transition rules

use std::time::Duration;

use tokio::time::Instant;

use crate::{
    error::MonitorError,
    state::{TimerSnapshot, TimerState},
};

/// Result of a tick that was accepted by a running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running with this much time left
    Progress(Duration),
    /// The deadline was reached on this tick
    Completed,
}

/// Clock-injected countdown state machine.
///
/// Remaining time is always recomputed from the absolute deadline, never
/// decremented, so late or coalesced ticks cannot accumulate drift.
#[derive(Debug, Clone)]
pub struct CountdownMachine {
    state: TimerState,
    remaining: Duration,
    deadline: Option<Instant>,
    leeway: Duration,
}

impl CountdownMachine {
    /// Create an idle machine. A tick that finds less than `leeway` left
    /// completes the countdown.
    pub fn new(leeway: Duration) -> Self {
        Self {
            state: TimerState::Idle,
            remaining: Duration::ZERO,
            deadline: None,
            leeway,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            remaining: self.remaining,
            deadline: self.deadline,
        }
    }

    pub fn start(&mut self, duration: Duration, now: Instant) -> Result<(), MonitorError> {
        if !self.state.can_start() {
            return Err(MonitorError::invalid("start", self.state.as_str()));
        }
        if duration.is_zero() {
            return Err(MonitorError::invalid("start an empty countdown", self.state.as_str()));
        }
        let deadline = now.checked_add(duration).ok_or_else(|| {
            MonitorError::invalid("start a countdown beyond the clock's range", self.state.as_str())
        })?;

        self.state = TimerState::Running;
        self.remaining = duration;
        self.deadline = Some(deadline);
        Ok(())
    }

    pub fn pause(&mut self, now: Instant) -> Result<(), MonitorError> {
        let deadline = match (self.state, self.deadline) {
            (TimerState::Running, Some(deadline)) => deadline,
            _ => return Err(MonitorError::invalid("pause", self.state.as_str())),
        };

        self.remaining = deadline.saturating_duration_since(now);
        self.deadline = None;
        self.state = TimerState::Paused;
        Ok(())
    }

    /// Resume from a pause. The new deadline is `now + remaining`, so the
    /// time spent paused is not counted.
    pub fn resume(&mut self, now: Instant) -> Result<(), MonitorError> {
        if self.state != TimerState::Paused {
            return Err(MonitorError::invalid("resume", self.state.as_str()));
        }
        let deadline = now.checked_add(self.remaining).ok_or_else(|| {
            MonitorError::invalid("resume a countdown beyond the clock's range", self.state.as_str())
        })?;

        self.deadline = Some(deadline);
        self.state = TimerState::Running;
        Ok(())
    }

    /// Force the machine back to idle from any state
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
        self.remaining = Duration::ZERO;
        self.deadline = None;
    }

    pub fn tick(&mut self, now: Instant) -> Result<TickOutcome, MonitorError> {
        let deadline = match (self.state, self.deadline) {
            (TimerState::Running, Some(deadline)) => deadline,
            _ => return Err(MonitorError::invalid("tick", self.state.as_str())),
        };

        let remaining = deadline.saturating_duration_since(now);
        if remaining <= self.leeway {
            self.state = TimerState::Completed;
            self.remaining = Duration::ZERO;
            self.deadline = None;
            return Ok(TickOutcome::Completed);
        }

        self.remaining = remaining;
        Ok(TickOutcome::Progress(remaining))
    }
}

impl Default for CountdownMachine {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEEWAY: Duration = Duration::from_millis(100);

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn start_sets_deadline_and_remaining() {
        let now = Instant::now();
        let mut machine = CountdownMachine::new(LEEWAY);

        machine.start(secs(10), now).unwrap();

        let snapshot = machine.snapshot();
        assert_eq!(snapshot.state, TimerState::Running);
        assert_eq!(snapshot.remaining, secs(10));
        assert_eq!(snapshot.deadline, Some(now + secs(10)));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut machine = CountdownMachine::new(LEEWAY);

        assert!(machine.start(Duration::ZERO, Instant::now()).is_err());
        assert_eq!(machine.state(), TimerState::Idle);
        assert_eq!(machine.snapshot().deadline, None);
    }

    #[test]
    fn duration_past_the_clock_range_is_rejected() {
        let now = Instant::now();
        let mut machine = CountdownMachine::new(LEEWAY);

        assert!(machine.start(Duration::from_secs(u64::MAX), now).is_err());
        assert_eq!(machine.state(), TimerState::Idle);
        assert_eq!(machine.snapshot().deadline, None);

        machine.start(secs(5), now).unwrap();
        assert_eq!(machine.state(), TimerState::Running);
    }

    #[test]
    fn start_is_rejected_while_running_or_paused() {
        let now = Instant::now();
        let mut machine = CountdownMachine::new(LEEWAY);
        machine.start(secs(10), now).unwrap();

        assert!(machine.start(secs(5), now).is_err());
        assert_eq!(machine.snapshot().remaining, secs(10));

        machine.pause(now + secs(2)).unwrap();
        assert!(machine.start(secs(5), now + secs(2)).is_err());
        assert_eq!(machine.state(), TimerState::Paused);
    }

    #[test]
    fn pause_freezes_and_resume_excludes_paused_time() {
        let t0 = Instant::now();
        let mut machine = CountdownMachine::new(LEEWAY);
        machine.start(secs(10), t0).unwrap();

        machine.pause(t0 + secs(3)).unwrap();
        assert_eq!(machine.snapshot().remaining, secs(7));
        assert_eq!(machine.snapshot().deadline, None);

        // a long idle period while paused
        let resumed_at = t0 + secs(600);
        machine.resume(resumed_at).unwrap();
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.state, TimerState::Running);
        assert_eq!(snapshot.remaining_at(resumed_at), secs(7));
        assert_eq!(snapshot.deadline, Some(resumed_at + secs(7)));
    }

    #[test]
    fn invalid_transitions_leave_state_alone() {
        let now = Instant::now();
        let mut machine = CountdownMachine::new(LEEWAY);

        assert_eq!(
            machine.pause(now),
            Err(MonitorError::invalid("pause", "idle"))
        );
        assert!(machine.resume(now).is_err());
        assert!(machine.tick(now).is_err());
        assert_eq!(machine.state(), TimerState::Idle);

        machine.start(secs(3), now).unwrap();
        assert!(machine.resume(now).is_err());
        assert_eq!(machine.state(), TimerState::Running);
    }

    #[test]
    fn late_tick_self_corrects() {
        let t0 = Instant::now();
        let mut machine = CountdownMachine::new(LEEWAY);
        machine.start(secs(10), t0).unwrap();

        assert_eq!(machine.tick(t0 + secs(1)), Ok(TickOutcome::Progress(secs(9))));
        // two ticks coalesced into one that arrives late
        assert_eq!(
            machine.tick(t0 + Duration::from_millis(3_400)),
            Ok(TickOutcome::Progress(Duration::from_millis(6_600)))
        );
    }

    #[test]
    fn tick_at_deadline_completes() {
        let t0 = Instant::now();
        let mut machine = CountdownMachine::new(LEEWAY);
        machine.start(secs(2), t0).unwrap();

        assert_eq!(machine.tick(t0 + secs(5)), Ok(TickOutcome::Completed));
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.state, TimerState::Completed);
        assert_eq!(snapshot.remaining, Duration::ZERO);
        assert_eq!(snapshot.deadline, None);

        assert!(machine.tick(t0 + secs(6)).is_err());
    }

    #[test]
    fn residue_within_leeway_completes() {
        let t0 = Instant::now();
        let mut machine = CountdownMachine::new(LEEWAY);
        machine.start(secs(2), t0).unwrap();

        let almost = t0 + secs(2) - Duration::from_millis(50);
        assert_eq!(machine.tick(almost), Ok(TickOutcome::Completed));
    }

    #[test]
    fn restart_from_completed_resets_remaining() {
        let t0 = Instant::now();
        let mut machine = CountdownMachine::new(LEEWAY);
        machine.start(secs(1), t0).unwrap();
        machine.tick(t0 + secs(1)).unwrap();
        assert_eq!(machine.state(), TimerState::Completed);

        let t1 = t0 + secs(4);
        machine.start(secs(30), t1).unwrap();
        assert_eq!(machine.state(), TimerState::Running);
        assert_eq!(machine.snapshot().remaining, secs(30));
    }

    #[test]
    fn cancel_returns_to_idle_from_anywhere() {
        let now = Instant::now();
        let mut machine = CountdownMachine::new(LEEWAY);

        machine.cancel();
        assert_eq!(machine.state(), TimerState::Idle);

        machine.start(secs(5), now).unwrap();
        machine.pause(now + secs(1)).unwrap();
        machine.cancel();
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.state, TimerState::Idle);
        assert_eq!(snapshot.remaining, Duration::ZERO);
        assert_eq!(snapshot.deadline, None);
    }
}
