//! Platform path-observer abstraction

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{error::MonitorError, state::ConnectivityStatus};

/// Raw reachability reported by a platform observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    Satisfied,
    Unsatisfied,
    RequiresConnection,
}

impl PathStatus {
    /// Only a satisfied path counts as online
    pub fn connectivity(&self) -> ConnectivityStatus {
        match self {
            PathStatus::Satisfied => ConnectivityStatus::Online,
            PathStatus::Unsatisfied | PathStatus::RequiresConnection => {
                ConnectivityStatus::Offline
            }
        }
    }
}

/// A raw event tagged with the observer generation that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathEvent {
    pub generation: u64,
    pub status: PathStatus,
}

/// Where an observer delivers its raw events
#[derive(Debug, Clone)]
pub struct PathEventSink {
    generation: u64,
    tx: mpsc::UnboundedSender<PathEvent>,
}

impl PathEventSink {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<PathEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Deliver a raw event. Returns `false` once the monitor has gone away.
    pub fn send(&self, status: PathStatus) -> bool {
        self.tx
            .send(PathEvent {
                generation: self.generation,
                status,
            })
            .is_ok()
    }
}

/// Exclusively owned handle to a running platform observer.
///
/// Cancelling consumes the handle. A cancelled observer never fires again and
/// cannot be restarted; the monitor asks its factory for a new one instead.
pub trait PathObserver: Send {
    fn cancel(self: Box<Self>);
}

/// Allocates platform observers
pub trait PathObserverFactory: Send + Sync + 'static {
    /// Begin observing and deliver every raw event to `sink`
    fn create(&self, sink: PathEventSink) -> Result<Box<dyn PathObserver>, MonitorError>;
}
