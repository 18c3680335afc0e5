//! Tracks spawned delivery tasks and owns the cancel signal.

use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use dd_core::{DroneId, RouteId};

use crate::{DeliveryOutcome, SimError, SimResult};

struct Tracked {
    drone:  DroneId,
    route:  RouteId,
    handle: JoinHandle<SimResult<DeliveryOutcome>>,
}

/// A joined delivery task.
#[derive(Debug)]
pub struct Finished {
    pub drone:  DroneId,
    pub route:  RouteId,
    pub result: SimResult<DeliveryOutcome>,
}

/// Owner of every delivery task in flight.
///
/// Nothing is detached: each spawn is recorded until it is reaped, so
/// completion and failure are always observable.  A single `watch` channel
/// carries the cancel signal to all tasks and to the scheduler.
pub struct Supervisor {
    cancel: watch::Sender<bool>,
    tasks:  Mutex<Vec<Tracked>>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self { cancel, tasks: Mutex::new(Vec::new()) }
    }

    /// A receiver that observes [`Supervisor::cancel`].
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.cancel.subscribe()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Signal every task and the scheduler to stop at their next hold.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Spawn `task` on the current tokio runtime and track it.
    ///
    /// # Panics
    ///
    /// Outside a tokio runtime, like `tokio::spawn`.
    pub fn spawn<F>(&self, drone: DroneId, route: RouteId, task: F)
    where
        F: Future<Output = SimResult<DeliveryOutcome>> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        self.tasks.lock().push(Tracked { drone, route, handle });
    }

    /// Tasks spawned and not yet finished.
    pub fn active(&self) -> usize {
        self.tasks.lock().iter().filter(|t| !t.handle.is_finished()).count()
    }

    /// Join every task that has already finished; running ones stay tracked.
    pub async fn reap(&self) -> Vec<Finished> {
        let done: Vec<Tracked> = {
            let mut tasks = self.tasks.lock();
            let (done, running): (Vec<Tracked>, Vec<Tracked>) = std::mem::take(&mut *tasks)
                .into_iter()
                .partition(|t| t.handle.is_finished());
            *tasks = running;
            done
        };
        join_all(done).await
    }

    /// Join tasks until none are tracked, including any spawned while
    /// waiting (a finishing task can trigger a pass that spawns more).
    pub async fn wait_idle(&self) -> Vec<Finished> {
        let mut finished = Vec::new();
        loop {
            let batch = std::mem::take(&mut *self.tasks.lock());
            if batch.is_empty() {
                return finished;
            }
            finished.extend(join_all(batch).await);
        }
    }

    /// Cancel, then wait for every task to wind down.
    pub async fn shutdown(&self) -> Vec<Finished> {
        self.cancel();
        let finished = self.wait_idle().await;
        debug!(joined = finished.len(), "supervisor shut down");
        finished
    }
}

async fn join_all(tasks: Vec<Tracked>) -> Vec<Finished> {
    let mut out = Vec::with_capacity(tasks.len());
    for Tracked { drone, route, handle } in tasks {
        let result = match handle.await {
            Ok(r) => r,
            Err(e) => {
                warn!(drone = %drone, route = %route, error = %e, "delivery task aborted");
                Err(SimError::TaskFailed { drone, reason: e.to_string() })
            }
        };
        out.push(Finished { drone, route, result });
    }
    out
}

/// Resolves once `rx` reads `true`, or its sender is gone.
pub(crate) async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}
