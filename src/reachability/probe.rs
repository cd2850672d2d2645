//! TCP probe observer

use std::time::Duration;

use tokio::{
    net::TcpStream,
    runtime::Handle,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info};

use super::observer::{PathEventSink, PathObserver, PathObserverFactory, PathStatus};
use crate::error::MonitorError;

/// Observer factory for hosts without an OS path notifier.
///
/// Each observer periodically opens a TCP connection to the media server
/// and reports `Satisfied` when the connection succeeds within the timeout.
#[derive(Debug, Clone)]
pub struct ProbeObserverFactory {
    target: String,
    interval: Duration,
    timeout: Duration,
}

impl ProbeObserverFactory {
    pub fn new(target: impl Into<String>, interval: Duration, timeout: Duration) -> Self {
        Self {
            target: target.into(),
            interval,
            timeout,
        }
    }
}

impl PathObserverFactory for ProbeObserverFactory {
    fn create(&self, sink: PathEventSink) -> Result<Box<dyn PathObserver>, MonitorError> {
        if self.target.trim().is_empty() {
            return Err(MonitorError::ResourceAllocationFailed(
                "no probe target configured".to_string(),
            ));
        }
        if self.interval.is_zero() {
            return Err(MonitorError::ResourceAllocationFailed(
                "probe interval must be non-zero".to_string(),
            ));
        }
        let runtime = Handle::try_current()
            .map_err(|e| MonitorError::ResourceAllocationFailed(e.to_string()))?;

        let target = self.target.clone();
        let interval = self.interval;
        let timeout = self.timeout;
        let generation = sink.generation();

        info!("Starting reachability probe for {} (generation {})", target, generation);
        let task = runtime.spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let status = probe(&target, timeout).await;
                debug!("Probe {} -> {:?}", target, status);
                if !sink.send(status) {
                    break;
                }
            }
        });

        Ok(Box::new(ProbeObserver { task: Some(task) }))
    }
}

async fn probe(target: &str, timeout: Duration) -> PathStatus {
    match time::timeout(timeout, TcpStream::connect(target)).await {
        Ok(Ok(_)) => PathStatus::Satisfied,
        Ok(Err(e)) => {
            debug!("Probe connect to {} failed: {}", target, e);
            PathStatus::Unsatisfied
        }
        Err(_) => {
            debug!("Probe connect to {} timed out after {:?}", target, timeout);
            PathStatus::Unsatisfied
        }
    }
}

/// Running probe task. Aborted on cancel or drop.
#[derive(Debug)]
pub struct ProbeObserver {
    task: Option<JoinHandle<()>>,
}

impl PathObserver for ProbeObserver {
    fn cancel(mut self: Box<Self>) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ProbeObserver {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
