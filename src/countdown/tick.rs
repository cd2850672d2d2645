//! Periodic tick resources

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::error::MonitorError;

/// One firing of a tick resource, tagged with the generation it was scheduled for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub generation: u64,
}

/// Owned handle to a scheduled tick resource.
///
/// A handle is consumed by [`TickHandle::cancel`] and cannot be rescheduled;
/// a new one must be obtained from the [`TickSource`]. Dropping the handle
/// cancels it as well.
#[derive(Debug)]
pub struct TickHandle {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl TickHandle {
    /// Wrap a spawned task that drives the ticks
    pub fn new(generation: u64, task: JoinHandle<()>) -> Self {
        Self {
            generation,
            task: Some(task),
        }
    }

    /// A handle with no background task, for sources that deliver ticks by other means
    pub fn detached(generation: u64) -> Self {
        Self {
            generation,
            task: None,
        }
    }

    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("Cancelling tick resource (generation {})", self.generation);
            task.abort();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Platform periodic-timer primitive.
///
/// Sources only deliver ticks. The countdown applies its own leeway when a
/// tick arrives, so no tolerance is passed down here.
pub trait TickSource: Send + Sync + 'static {
    /// Schedule ticks every `period`, the first one a full period from now.
    /// Every tick is delivered to `sink` tagged with `generation`.
    fn schedule(
        &self,
        generation: u64,
        period: Duration,
        sink: mpsc::UnboundedSender<TickEvent>,
    ) -> Result<TickHandle, MonitorError>;
}

/// Tick source backed by a tokio interval
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTickSource;

impl TickSource for TokioTickSource {
    fn schedule(
        &self,
        generation: u64,
        period: Duration,
        sink: mpsc::UnboundedSender<TickEvent>,
    ) -> Result<TickHandle, MonitorError> {
        if period.is_zero() {
            return Err(MonitorError::ResourceAllocationFailed(
                "tick period must be non-zero".to_string(),
            ));
        }

        let first = Instant::now().checked_add(period).ok_or_else(|| {
            MonitorError::ResourceAllocationFailed("tick period out of range".to_string())
        })?;
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if sink.send(TickEvent { generation }).is_err() {
                    break;
                }
            }
        });

        Ok(TickHandle::new(generation, task))
    }
}
