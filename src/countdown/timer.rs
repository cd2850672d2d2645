//! Countdown timer actor

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, oneshot, watch},
    time::Instant,
};
use tracing::{debug, info, warn};

use super::{
    machine::{CountdownMachine, TickOutcome},
    tick::{TickEvent, TickHandle, TickSource, TokioTickSource},
};
use crate::{
    error::MonitorError,
    state::{TimerSnapshot, TimerState},
};

pub type TickCallback = Arc<dyn Fn(Duration) + Send + Sync>;
pub type CompleteCallback = Arc<dyn Fn() + Send + Sync>;

/// Tick cadence for a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownConfig {
    pub tick_period: Duration,
    /// Completion tolerance applied on each tick
    pub leeway: Duration,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            leeway: Duration::from_millis(100),
        }
    }
}

enum TimerCommand {
    Start {
        duration: Duration,
        ack: oneshot::Sender<()>,
    },
    Pause {
        ack: oneshot::Sender<()>,
    },
    Resume {
        ack: oneshot::Sender<()>,
    },
    Cancel {
        ack: oneshot::Sender<()>,
    },
    SetCallbacks {
        on_tick: TickCallback,
        on_complete: CompleteCallback,
        ack: oneshot::Sender<()>,
    },
}

/// Handle to a pausable countdown driven by a periodic tick.
///
/// All mutation happens on a single actor task. Mutating calls wait until
/// the actor has committed them; `state()` and `remaining()` read the last
/// published snapshot and never wait. Dropping the handle stops the actor
/// and cancels any scheduled tick.
pub struct CountdownTimer {
    commands: mpsc::UnboundedSender<TimerCommand>,
    snapshot: watch::Receiver<TimerSnapshot>,
}

impl CountdownTimer {
    /// Spawn a countdown on the current tokio runtime using tokio intervals
    pub fn new(config: CountdownConfig) -> Self {
        Self::with_tick_source(config, Arc::new(TokioTickSource))
    }

    pub fn with_tick_source(config: CountdownConfig, ticks: Arc<dyn TickSource>) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(TimerSnapshot::default());

        let actor = TimerActor {
            config,
            machine: CountdownMachine::new(config.leeway),
            ticks,
            tick_tx,
            tick_handle: None,
            generation: 0,
            on_tick: None,
            on_complete: None,
            snapshot_tx,
        };
        tokio::spawn(actor.run(command_rx, tick_rx));

        Self { commands, snapshot }
    }

    /// Start counting down `duration`. Ignored unless idle or completed, and
    /// ignored for a zero duration.
    pub async fn start(&self, duration: Duration) {
        self.request(|ack| TimerCommand::Start { duration, ack }).await
    }

    pub async fn pause(&self) {
        self.request(|ack| TimerCommand::Pause { ack }).await
    }

    pub async fn resume(&self) {
        self.request(|ack| TimerCommand::Resume { ack }).await
    }

    /// Return to idle from any state. No callback fires for the cancelled run.
    pub async fn cancel(&self) {
        self.request(|ack| TimerCommand::Cancel { ack }).await
    }

    /// Replace both callbacks. They run on the timer's actor task.
    pub async fn set_callbacks<T, C>(&self, on_tick: T, on_complete: C)
    where
        T: Fn(Duration) + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        let on_tick: TickCallback = Arc::new(on_tick);
        let on_complete: CompleteCallback = Arc::new(on_complete);
        self.request(|ack| TimerCommand::SetCallbacks {
            on_tick,
            on_complete,
            ack,
        })
        .await
    }

    pub fn state(&self) -> TimerState {
        self.snapshot.borrow().state
    }

    pub fn remaining(&self) -> Duration {
        self.snapshot.borrow().remaining_at(Instant::now())
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        *self.snapshot.borrow()
    }

    /// Receiver that observes every published snapshot
    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot.clone()
    }

    async fn request<F>(&self, make: F)
    where
        F: FnOnce(oneshot::Sender<()>) -> TimerCommand,
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

impl std::fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("snapshot", &*self.snapshot.borrow())
            .finish()
    }
}

struct TimerActor {
    config: CountdownConfig,
    machine: CountdownMachine,
    ticks: Arc<dyn TickSource>,
    tick_tx: mpsc::UnboundedSender<TickEvent>,
    tick_handle: Option<TickHandle>,
    /// Bumped whenever the tick resource is replaced or torn down
    generation: u64,
    on_tick: Option<TickCallback>,
    on_complete: Option<CompleteCallback>,
    snapshot_tx: watch::Sender<TimerSnapshot>,
}

impl TimerActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<TimerCommand>,
        mut ticks: mpsc::UnboundedReceiver<TickEvent>,
    ) {
        debug!("Countdown actor started");

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(tick) = ticks.recv() => self.handle_tick(tick),
            }
        }

        self.release_ticks();
        debug!("Countdown actor stopped");
    }

    fn handle_command(&mut self, command: TimerCommand) {
        let now = Instant::now();
        match command {
            TimerCommand::Start { duration, ack } => {
                match self.machine.start(duration, now) {
                    Ok(()) => {
                        if self.schedule_ticks() {
                            info!("Countdown started for {:?}", duration);
                        }
                        self.publish();
                    }
                    Err(e) => debug!("Ignoring start: {}", e),
                }
                let _ = ack.send(());
            }
            TimerCommand::Pause { ack } => {
                match self.machine.pause(now) {
                    Ok(()) => {
                        self.release_ticks();
                        self.publish();
                        info!("Countdown paused with {:?} left", self.machine.snapshot().remaining);
                    }
                    Err(e) => debug!("Ignoring pause: {}", e),
                }
                let _ = ack.send(());
            }
            TimerCommand::Resume { ack } => {
                match self.machine.resume(now) {
                    Ok(()) => {
                        if self.schedule_ticks() {
                            info!("Countdown resumed with {:?} left", self.machine.snapshot().remaining);
                        }
                        self.publish();
                    }
                    Err(e) => debug!("Ignoring resume: {}", e),
                }
                let _ = ack.send(());
            }
            TimerCommand::Cancel { ack } => {
                let previous = self.machine.state();
                self.release_ticks();
                self.machine.cancel();
                self.publish();
                if previous != TimerState::Idle {
                    info!("Countdown cancelled while {}", previous);
                }
                let _ = ack.send(());
            }
            TimerCommand::SetCallbacks {
                on_tick,
                on_complete,
                ack,
            } => {
                self.on_tick = Some(on_tick);
                self.on_complete = Some(on_complete);
                let _ = ack.send(());
            }
        }
    }

    fn handle_tick(&mut self, tick: TickEvent) {
        if tick.generation != self.generation || self.tick_handle.is_none() {
            debug!(
                "Dropping stale tick (generation {}, current {})",
                tick.generation, self.generation
            );
            return;
        }

        match self.machine.tick(Instant::now()) {
            Ok(TickOutcome::Progress(remaining)) => {
                self.publish();
                if let Some(on_tick) = &self.on_tick {
                    on_tick(remaining);
                }
            }
            Ok(TickOutcome::Completed) => {
                self.release_ticks();
                self.publish();
                info!("Countdown completed");
                if let Some(on_tick) = &self.on_tick {
                    on_tick(Duration::ZERO);
                }
                if let Some(on_complete) = &self.on_complete {
                    on_complete();
                }
            }
            Err(e) => debug!("Ignoring tick: {}", e),
        }
    }

    /// Allocate a fresh tick resource; a cancelled one is never reused.
    /// Without one the countdown cannot progress, so it falls back to idle.
    fn schedule_ticks(&mut self) -> bool {
        self.release_ticks();
        self.generation += 1;
        match self
            .ticks
            .schedule(self.generation, self.config.tick_period, self.tick_tx.clone())
        {
            Ok(handle) => {
                self.tick_handle = Some(handle);
                true
            }
            Err(e) => {
                warn!("Countdown dropped to idle: {}", e);
                self.machine.cancel();
                false
            }
        }
    }

    fn release_ticks(&mut self) {
        if let Some(handle) = self.tick_handle.take() {
            handle.cancel();
            self.generation += 1;
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.machine.snapshot());
    }
}
