//! Reachability monitor actor

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    time::{self, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use super::observer::{PathEvent, PathEventSink, PathObserver, PathObserverFactory};
use crate::{
    error::MonitorError,
    state::{ConnectivityRestored, ConnectivityStatus},
};

pub type StatusHandler = Arc<dyn Fn(ConnectivityStatus) + Send + Sync>;

/// Watchdog cadence for a reachability monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReachabilityConfig {
    pub watchdog_period: Duration,
    /// How long an offline streak may last before the observer is replaced
    pub watchdog_threshold: Duration,
}

impl ReachabilityConfig {
    /// Threshold of two missed watchdog confirmations
    pub fn with_period(watchdog_period: Duration) -> Self {
        Self {
            watchdog_period,
            watchdog_threshold: watchdog_period * 2,
        }
    }
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self::with_period(Duration::from_secs(3))
    }
}

enum MonitorCommand {
    Start {
        ack: oneshot::Sender<()>,
    },
    Stop {
        ack: oneshot::Sender<()>,
    },
    ForceRefresh {
        ack: oneshot::Sender<()>,
    },
    SetHandler {
        handler: StatusHandler,
        ack: oneshot::Sender<()>,
    },
}

/// Handle to a debounced, self-healing reachability monitor.
///
/// The monitor state lives on one actor task; raw path events, watchdog ticks
/// and caller requests are all handled there one at a time. Dropping the
/// handle stops the actor and releases the observer.
pub struct ReachabilityMonitor {
    commands: mpsc::UnboundedSender<MonitorCommand>,
    status: watch::Receiver<ConnectivityStatus>,
    restored: broadcast::Sender<ConnectivityRestored>,
}

impl ReachabilityMonitor {
    /// Spawn a monitor on the current tokio runtime. Observation begins on `start()`.
    pub fn new(factory: Arc<dyn PathObserverFactory>, config: ReachabilityConfig) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(ConnectivityStatus::Unknown);
        let (restored, _) = broadcast::channel(16);

        let actor = MonitorActor {
            factory,
            config,
            observer: None,
            generation: 0,
            event_tx,
            status: ConnectivityStatus::Unknown,
            offline_since: None,
            streak_rebuilt: false,
            watchdog: None,
            handler: None,
            status_tx,
            restored_tx: restored.clone(),
        };
        tokio::spawn(actor.run(command_rx, event_rx));

        Self {
            commands,
            status,
            restored,
        }
    }

    /// Allocate a fresh observer and start the watchdog. No-op while running.
    pub async fn start(&self) {
        self.request(|ack| MonitorCommand::Start { ack }).await
    }

    /// Cancel the observer and the watchdog. Safe to call repeatedly.
    pub async fn stop(&self) {
        self.request(|ack| MonitorCommand::Stop { ack }).await
    }

    /// Restart the offline-streak clock after an out-of-band failure, such as
    /// a failed API call, so the watchdog replaces a wedged observer even if
    /// it never reported the outage.
    pub async fn force_refresh(&self) {
        self.request(|ack| MonitorCommand::ForceRefresh { ack }).await
    }

    pub fn current_status(&self) -> ConnectivityStatus {
        *self.status.borrow()
    }

    /// Register the single status-change handler, replacing any previous one.
    /// It runs on the monitor's actor task, once per debounced transition.
    pub async fn on_status_change<F>(&self, handler: F)
    where
        F: Fn(ConnectivityStatus) + Send + Sync + 'static,
    {
        let handler: StatusHandler = Arc::new(handler);
        self.request(|ack| MonitorCommand::SetHandler { handler, ack }).await
    }

    /// Receiver for every debounced status, for owners that need fan-out
    pub fn watch_status(&self) -> watch::Receiver<ConnectivityStatus> {
        self.status.clone()
    }

    /// Subscribe to the "connectivity restored" broadcast
    pub fn subscribe_restored(&self) -> broadcast::Receiver<ConnectivityRestored> {
        self.restored.subscribe()
    }

    async fn request<F>(&self, make: F)
    where
        F: FnOnce(oneshot::Sender<()>) -> MonitorCommand,
    {
        let (ack, done) = oneshot::channel();
        if self.commands.send(make(ack)).is_err() {
            debug!("{}", MonitorError::ActorGone);
            return;
        }
        if done.await.is_err() {
            debug!("{}", MonitorError::ActorGone);
        }
    }
}

impl std::fmt::Debug for ReachabilityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReachabilityMonitor")
            .field("status", &*self.status.borrow())
            .finish()
    }
}

struct MonitorActor {
    factory: Arc<dyn PathObserverFactory>,
    config: ReachabilityConfig,
    /// Present exactly while running
    observer: Option<Box<dyn PathObserver>>,
    /// Bumped on every observer allocation and teardown
    generation: u64,
    event_tx: mpsc::UnboundedSender<PathEvent>,
    status: ConnectivityStatus,
    offline_since: Option<Instant>,
    /// The observer was already replaced during the current offline streak
    streak_rebuilt: bool,
    watchdog: Option<Interval>,
    handler: Option<StatusHandler>,
    status_tx: watch::Sender<ConnectivityStatus>,
    restored_tx: broadcast::Sender<ConnectivityRestored>,
}

impl MonitorActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<MonitorCommand>,
        mut events: mpsc::UnboundedReceiver<PathEvent>,
    ) {
        debug!("Reachability actor started");

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = events.recv() => self.handle_path_event(event),
                _ = next_watchdog_tick(&mut self.watchdog) => self.check_watchdog(),
            }
        }

        self.teardown();
        debug!("Reachability actor stopped");
    }

    fn handle_command(&mut self, command: MonitorCommand) {
        match command {
            MonitorCommand::Start { ack } => {
                self.start();
                let _ = ack.send(());
            }
            MonitorCommand::Stop { ack } => {
                if self.observer.is_some() {
                    self.teardown();
                    info!("Reachability monitor stopped");
                }
                let _ = ack.send(());
            }
            MonitorCommand::ForceRefresh { ack } => {
                info!("Forced refresh, restarting offline streak clock");
                self.offline_since = Some(Instant::now());
                self.streak_rebuilt = false;
                let _ = ack.send(());
            }
            MonitorCommand::SetHandler { handler, ack } => {
                self.handler = Some(handler);
                let _ = ack.send(());
            }
        }
    }

    fn start(&mut self) {
        if self.observer.is_some() {
            debug!("Reachability monitor already running");
            return;
        }

        let started = watchdog_interval(self.config.watchdog_period).and_then(|watchdog| {
            self.allocate_observer().map(|observer| (observer, watchdog))
        });

        match started {
            Ok((observer, watchdog)) => {
                self.observer = Some(observer);
                self.offline_since = None;
                self.streak_rebuilt = false;
                self.watchdog = Some(watchdog);
                info!("Reachability monitor started (generation {})", self.generation);
            }
            Err(e) => {
                warn!("Reachability monitor not started: {}", e);
                self.degrade_to_unknown();
            }
        }
    }

    /// Nothing is observing, so the last debounced value can no longer be trusted
    fn degrade_to_unknown(&mut self) {
        if self.status != ConnectivityStatus::Unknown {
            self.publish(ConnectivityStatus::Unknown);
        }
    }

    fn allocate_observer(&mut self) -> Result<Box<dyn PathObserver>, MonitorError> {
        self.generation += 1;
        let sink = PathEventSink::new(self.generation, self.event_tx.clone());
        self.factory.create(sink)
    }

    fn teardown(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.cancel();
        }
        self.generation += 1;
        self.watchdog = None;
        self.offline_since = None;
        self.streak_rebuilt = false;
    }

    fn handle_path_event(&mut self, event: PathEvent) {
        if event.generation != self.generation || self.observer.is_none() {
            debug!(
                "Dropping path event from stale observer (generation {}, current {})",
                event.generation, self.generation
            );
            return;
        }

        let mapped = event.status.connectivity();
        debug!("Raw path event {:?} -> {}", event.status, mapped);

        match mapped {
            ConnectivityStatus::Offline => {
                self.offline_since.get_or_insert_with(Instant::now);
            }
            ConnectivityStatus::Online => {
                self.offline_since = None;
                self.streak_rebuilt = false;
            }
            ConnectivityStatus::Unknown => {}
        }

        if mapped != self.status {
            self.publish(mapped);
        }
    }

    fn check_watchdog(&mut self) {
        if self.observer.is_none() || self.streak_rebuilt {
            return;
        }
        let Some(since) = self.offline_since else {
            return;
        };
        let offline_for = since.elapsed();
        if offline_for < self.config.watchdog_threshold {
            return;
        }

        warn!(
            "Offline for {:?}, replacing path observer (generation {})",
            offline_for, self.generation
        );
        if let Some(observer) = self.observer.take() {
            observer.cancel();
        }

        match self.allocate_observer() {
            Ok(observer) => {
                self.observer = Some(observer);
                self.streak_rebuilt = true;
                info!("Path observer replaced (generation {})", self.generation);
            }
            Err(e) => {
                warn!("Path observer could not be replaced, monitor stopped: {}", e);
                self.teardown();
                self.degrade_to_unknown();
            }
        }
    }

    fn publish(&mut self, status: ConnectivityStatus) {
        let previous = self.status;
        self.status = status;
        self.status_tx.send_replace(status);
        info!("Connectivity changed: {} -> {}", previous, status);

        if let Some(handler) = &self.handler {
            handler(status);
        }

        if status == ConnectivityStatus::Online {
            let restored = ConnectivityRestored {
                previous,
                at: Utc::now(),
            };
            // no subscribers is fine
            let _ = self.restored_tx.send(restored);
        }
    }
}

fn watchdog_interval(period: Duration) -> Result<Interval, MonitorError> {
    if period.is_zero() {
        return Err(MonitorError::ResourceAllocationFailed(
            "watchdog period must be non-zero".to_string(),
        ));
    }
    let first = Instant::now().checked_add(period).ok_or_else(|| {
        MonitorError::ResourceAllocationFailed("watchdog period out of range".to_string())
    })?;

    let mut interval = time::interval_at(first, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Ok(interval)
}

async fn next_watchdog_tick(watchdog: &mut Option<Interval>) {
    match watchdog {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
