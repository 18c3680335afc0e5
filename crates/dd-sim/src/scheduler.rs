//! Periodic and proactive reconciliation.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use dd_route::RoutePlanner;

use crate::Dispatcher;
use crate::supervisor::cancelled;

/// Counters for a finished scheduler loop.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    /// Passes started by the timer.
    pub ticks:     u64,
    /// Passes started by a drone returning to base.
    pub proactive: u64,
    /// Passes that returned an error (logged, loop kept going).
    pub failed:    u64,
}

/// Drives [`Dispatcher::dispatch`] on a fixed period and whenever a delivery
/// task signals that a drone is free again.
///
/// The loop stops when the dispatcher's supervisor is cancelled.
pub struct Scheduler<P: RoutePlanner> {
    dispatcher: Arc<Dispatcher<P>>,
}

impl<P: RoutePlanner> Scheduler<P> {
    pub fn new(dispatcher: Arc<Dispatcher<P>>) -> Self {
        Self { dispatcher }
    }

    /// Run on the current runtime as its own task.
    pub fn spawn(self) -> JoinHandle<SchedulerReport> {
        tokio::spawn(self.run())
    }

    /// Loop until cancelled.  The first timer tick fires immediately.
    pub async fn run(self) -> SchedulerReport {
        let period = self.dispatcher.config().tick_period();
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown = self.dispatcher.supervisor().subscribe();
        let mut report = SchedulerReport::default();

        info!(period_ms = period.as_millis() as u64, "reconciliation scheduler started");
        loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut shutdown) => break,
                _ = ticker.tick() => {
                    report.ticks += 1;
                    self.pass(&mut report);
                    self.reap().await;
                }
                _ = self.dispatcher.kicked() => {
                    report.proactive += 1;
                    self.pass(&mut report);
                    self.reap().await;
                }
            }
        }
        info!(
            ticks     = report.ticks,
            proactive = report.proactive,
            failed    = report.failed,
            "reconciliation scheduler stopped"
        );
        report
    }

    /// Drop finished tasks from the supervisor, surfacing failures.
    async fn reap(&self) {
        for finished in self.dispatcher.supervisor().reap().await {
            if let Err(e) = finished.result {
                error!(drone = %finished.drone, route = %finished.route, error = %e, "delivery task failed");
            }
        }
    }

    fn pass(&self, report: &mut SchedulerReport) {
        if let Err(e) = self.dispatcher.dispatch() {
            report.failed += 1;
            error!(error = %e, "reconciliation pass failed");
        }
    }
}
