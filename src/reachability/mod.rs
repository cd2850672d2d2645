//! Network reachability monitoring
//!
//! A [`ReachabilityMonitor`] turns raw path events from a platform
//! [`PathObserver`] into a debounced [`ConnectivityStatus`](crate::state::ConnectivityStatus)
//! and replaces the observer when it looks wedged.

pub mod monitor;
pub mod observer;
pub mod probe;

pub use monitor::{ReachabilityConfig, ReachabilityMonitor, StatusHandler};
pub use observer::{PathEvent, PathEventSink, PathObserver, PathObserverFactory, PathStatus};
pub use probe::{ProbeObserver, ProbeObserverFactory};
