//! Serialized, debounced execution of refresh passes.
//!
//! Triggers are cheap and never block. A trigger arriving while idle marks a
//! pass as pending; the pass starts one delay after that first trigger, and
//! further triggers in the meantime are absorbed by it. A trigger arriving
//! while a pass runs marks one more pass as pending, which starts one delay
//! after the running pass finishes. The running pass is never interrupted.
//!
//! At most one pass runs at a time, the last trigger of a burst is always
//! followed by a pass, and a steady stream of triggers still produces a pass
//! at least once per delay plus pass duration.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::engine::{Engine, Snapshot};

/// Latest state published by the runner.
#[derive(Debug, Clone, Default)]
pub struct RunnerState {
    /// Number of passes finished, successful or not
    pub generation: u64,

    /// Last successful snapshot; kept when a later pass fails
    pub snapshot: Option<Arc<Snapshot>>,

    /// Error of the most recent pass, cleared by the next success
    pub error: Option<String>,
}

pub struct RefreshRunner {
    trigger_tx: mpsc::UnboundedSender<()>,
    state_rx: watch::Receiver<RunnerState>,
    task: JoinHandle<()>,
}

impl RefreshRunner {
    /// Spawns the runner on the current tokio runtime.
    pub fn spawn(engine: Arc<Engine>, delay: Duration) -> Self {
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let initial = RunnerState {
            snapshot: engine.last_snapshot(),
            ..RunnerState::default()
        };
        let (state_tx, state_rx) = watch::channel(initial);
        let task = tokio::spawn(run_loop(engine, delay, trigger_rx, state_tx));
        Self {
            trigger_tx,
            state_rx,
            task,
        }
    }

    /// Requests a pass.
    pub fn trigger(&self) {
        let _ = self.trigger_tx.send(());
    }

    pub fn subscribe(&self) -> watch::Receiver<RunnerState> {
        self.state_rx.clone()
    }

    pub fn state(&self) -> RunnerState {
        self.state_rx.borrow().clone()
    }

    /// Stops accepting triggers and waits for a running pass to finish.
    pub async fn shutdown(self) {
        drop(self.trigger_tx);
        let _ = self.task.await;
    }
}

async fn run_loop(
    engine: Arc<Engine>,
    delay: Duration,
    mut trigger_rx: mpsc::UnboundedReceiver<()>,
    state_tx: watch::Sender<RunnerState>,
) {
    // Some(t): a pass is pending and starts at `t + delay`.
    let mut pending_since: Option<Instant> = None;
    let mut closed = false;

    while !closed || pending_since.is_some() {
        let timeout = match pending_since {
            Some(since) => delay.saturating_sub(since.elapsed()),
            None => Duration::from_secs(3600),
        };

        tokio::select! {
            msg = trigger_rx.recv(), if !closed => {
                match msg {
                    Some(()) => {
                        if pending_since.is_none() {
                            pending_since = Some(Instant::now());
                        }
                    }
                    None => {
                        closed = true;
                        pending_since = None;
                    }
                }
            }
            _ = tokio::time::sleep(timeout), if pending_since.is_some() => {
                pending_since = None;
                let pass_engine = Arc::clone(&engine);
                let mut pass = tokio::task::spawn_blocking(move || pass_engine.refresh());

                let mut retrigger = false;
                let outcome = loop {
                    tokio::select! {
                        outcome = &mut pass => break outcome,
                        msg = trigger_rx.recv(), if !closed => match msg {
                            Some(()) => {
                                debug!("Refresh requested during a pass, marking pending");
                                retrigger = true;
                            }
                            None => closed = true,
                        },
                    }
                };

                state_tx.send_modify(|state| {
                    state.generation += 1;
                    match outcome {
                        Ok(Ok(snapshot)) => {
                            state.snapshot = Some(snapshot);
                            state.error = None;
                        }
                        Ok(Err(e)) => {
                            error!("Refresh failed, keeping the previous dashboard: {}", e);
                            state.error = Some(e.to_string());
                        }
                        Err(e) => {
                            error!("Refresh task panicked: {}", e);
                            state.error = Some(e.to_string());
                        }
                    }
                });
                if retrigger && !closed {
                    pending_since = Some(Instant::now());
                }
            }
        }
    }
    debug!("Refresh runner stopped");
}
