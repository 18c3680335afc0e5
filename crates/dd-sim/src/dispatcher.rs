//! Order intake, dispatch and the read-side API.

use std::sync::Arc;

use tokio::sync::Notify;
use tracing::{debug, info};

use dd_alloc::{Allocation, AllocationEngine, PassOutcome};
use dd_core::{OrderState, Priority};
use dd_fleet::{DroneView, NewOrder, Order, Route, Statistics};
use dd_route::RoutePlanner;

use crate::{DeliveryObserver, DeliveryTask, Finished, SimConfig, SimResult, Supervisor};

/// The simulator's front door.
///
/// Owns the allocation engine (and through it the three stores), the task
/// supervisor and the proactive-reconciliation signal.  Share it as
/// `Arc<Dispatcher<P>>` between the scheduler and callers.
///
/// Create via [`DispatcherBuilder`][crate::DispatcherBuilder].
pub struct Dispatcher<P: RoutePlanner> {
    pub(crate) engine:     AllocationEngine<P>,
    pub(crate) config:     SimConfig,
    pub(crate) observer:   Arc<dyn DeliveryObserver>,
    pub(crate) supervisor: Supervisor,
    /// Notified by a delivery task when its drone is back at base.
    pub(crate) kick:       Arc<Notify>,
}

impl<P: RoutePlanner> Dispatcher<P> {
    #[inline]
    pub fn engine(&self) -> &AllocationEngine<P> {
        &self.engine
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Resolves the next time a returning drone asks for a pass.
    pub async fn kicked(&self) {
        self.kick.notified().await;
    }

    // ── Intake ────────────────────────────────────────────────────────────

    /// Validate and store an order, then dispatch at once if it is pending.
    ///
    /// The returned order carries the state decided at submission
    /// (`Pending` or `Refused`); the immediate dispatch may already have
    /// moved the stored copy on to `Allocated`.
    ///
    /// # Errors
    ///
    /// `InvalidOrder` for a non-positive payload.
    ///
    /// # Panics
    ///
    /// Outside a tokio runtime when the dispatch spawns a delivery task.
    pub fn submit_order(&self, x: i32, y: i32, payload_kg: f64, priority: Priority) -> SimResult<Order> {
        let order = self.engine.submit(NewOrder::new(x, y, payload_kg, priority))?;
        if order.state == OrderState::Pending {
            self.dispatch()?;
        }
        Ok(order)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Run one allocation pass and start a delivery task per allocation.
    ///
    /// Does nothing once the supervisor has been cancelled.
    ///
    /// # Errors
    ///
    /// Propagates a store error from the pass.
    pub fn dispatch(&self) -> SimResult<PassOutcome> {
        if self.supervisor.is_cancelled() {
            debug!("dispatch skipped: shutting down");
            return Ok(PassOutcome::default());
        }

        let outcome = self.engine.run_pass()?;
        for allocation in &outcome.allocations {
            self.launch(allocation);
        }

        if outcome.allocations.is_empty() {
            debug!(
                idle    = outcome.idle_drones,
                pending = outcome.still_pending,
                "reconciliation pass: nothing to allocate"
            );
        } else {
            info!(
                idle        = outcome.idle_drones,
                allocations = outcome.allocations.len(),
                pending     = outcome.still_pending,
                "reconciliation pass"
            );
        }
        self.observer.on_pass(&outcome);
        Ok(outcome)
    }

    fn launch(&self, allocation: &Allocation) {
        let task = DeliveryTask::new(
            allocation,
            &self.config,
            &self.engine,
            Arc::clone(&self.observer),
            self.supervisor.subscribe(),
            Arc::clone(&self.kick),
        );
        self.supervisor.spawn(allocation.drone, allocation.route, task.run());
    }

    // ── Read side ─────────────────────────────────────────────────────────

    /// `{id, capacity, range, status}` per drone, in id order.
    pub fn list_drones(&self) -> Vec<DroneView> {
        self.engine.drones.views()
    }

    /// Every order, in id order.
    pub fn list_orders(&self) -> Vec<Order> {
        self.engine.orders.find_all()
    }

    /// Every route, in id order.
    pub fn list_routes(&self) -> Vec<Route> {
        self.engine.routes.find_all()
    }

    /// Fleet-wide counters, read between allocation passes.
    pub fn statistics(&self) -> Statistics {
        self.engine.between_passes(|| {
            Statistics::compute(&self.list_routes(), &self.list_orders(), &self.list_drones())
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Wait until no delivery task is running, including tasks started by
    /// proactive passes along the way.
    pub async fn wait_idle(&self) -> Vec<Finished> {
        self.supervisor.wait_idle().await
    }

    /// Cancel every task and the scheduler, then join the tasks.
    pub async fn shutdown(&self) -> Vec<Finished> {
        info!(active = self.supervisor.active(), "dispatcher shutting down");
        self.supervisor.shutdown().await
    }
}
