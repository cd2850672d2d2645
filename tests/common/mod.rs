//! Shared test utilities and fixtures
//!
//! Scriptable observer and tick sources for driving the monitors under a
//! paused tokio clock.

#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use media_monitors::{
    countdown::{TickEvent, TickHandle, TickSource},
    reachability::{PathEventSink, PathObserver, PathObserverFactory, PathStatus},
    MonitorError,
};
use tokio::sync::mpsc;

/// Let spawned actors drain their inboxes
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Observer factory that counts allocations and lets tests inject raw events
#[derive(Default)]
pub struct FakeObserverFactory {
    pub allocations: AtomicUsize,
    pub failed_allocations: AtomicUsize,
    pub cancellations: Arc<AtomicUsize>,
    pub fail: AtomicBool,
    sinks: Mutex<Vec<PathEventSink>>,
}

impl FakeObserverFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Emit a raw event from the most recently allocated observer
    pub fn emit(&self, status: PathStatus) {
        let sinks = self.sinks.lock().unwrap();
        let sink = sinks.last().expect("no observer allocated");
        sink.send(status);
    }

    /// Emit a raw event from the observer allocated `index`-th (zero based)
    pub fn emit_from(&self, index: usize, status: PathStatus) {
        let sinks = self.sinks.lock().unwrap();
        sinks[index].send(status);
    }
}

impl PathObserverFactory for FakeObserverFactory {
    fn create(&self, sink: PathEventSink) -> Result<Box<dyn PathObserver>, MonitorError> {
        if self.fail.load(Ordering::SeqCst) {
            self.failed_allocations.fetch_add(1, Ordering::SeqCst);
            return Err(MonitorError::ResourceAllocationFailed(
                "fake platform refused".to_string(),
            ));
        }

        self.allocations.fetch_add(1, Ordering::SeqCst);
        self.sinks.lock().unwrap().push(sink);
        Ok(Box::new(FakeObserver {
            cancellations: Arc::clone(&self.cancellations),
        }))
    }
}

struct FakeObserver {
    cancellations: Arc<AtomicUsize>,
}

impl PathObserver for FakeObserver {
    fn cancel(self: Box<Self>) {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Tick source that never fires on its own; tests deliver ticks by hand
#[derive(Default)]
pub struct ManualTickSource {
    scheduled: Mutex<Vec<(u64, mpsc::UnboundedSender<TickEvent>)>>,
}

impl ManualTickSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn scheduled(&self) -> usize {
        self.scheduled.lock().unwrap().len()
    }

    /// Fire the tick resource scheduled `index`-th (zero based)
    pub fn fire(&self, index: usize) {
        let scheduled = self.scheduled.lock().unwrap();
        let (generation, sink) = &scheduled[index];
        let _ = sink.send(TickEvent {
            generation: *generation,
        });
    }
}

impl TickSource for ManualTickSource {
    fn schedule(
        &self,
        generation: u64,
        _period: Duration,
        sink: mpsc::UnboundedSender<TickEvent>,
    ) -> Result<TickHandle, MonitorError> {
        self.scheduled.lock().unwrap().push((generation, sink));
        Ok(TickHandle::detached(generation))
    }
}

/// Records every callback a countdown makes
#[derive(Default, Clone)]
pub struct CallbackLog {
    pub ticks: Arc<Mutex<Vec<Duration>>>,
    pub completions: Arc<AtomicUsize>,
}

impl CallbackLog {
    pub fn ticks(&self) -> Vec<Duration> {
        self.ticks.lock().unwrap().clone()
    }

    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}
