//! One delivery batch flown as a tokio task.

use std::sync::Arc;

use tokio::sync::{Notify, watch};
use tracing::{error, info, warn};

use dd_alloc::{Allocation, AllocationEngine};
use dd_core::{BASE, DdError, DdResult, DroneId, DroneStatus, GridPoint, OrderState, RouteId, RouteStatus, TimeScale};
use dd_fleet::{DroneRegistry, Order, OrderStore, RouteStore};
use dd_route::{RoutePlanner, legs};

use crate::supervisor::cancelled;
use crate::{DeliveryObserver, InterruptPolicy, SimConfig, SimResult};

/// How a task ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Every order delivered and the drone is back at base.
    Completed { delivered: usize },
    /// Cancelled at a hold.  `requeued` is zero under
    /// [`InterruptPolicy::Abandon`].
    Interrupted { delivered: usize, requeued: usize },
}

/// Why [`DeliveryTask::fly`] stopped early.
enum Stop {
    Cancelled,
    Failed(DdError),
}

impl From<DdError> for Stop {
    fn from(e: DdError) -> Self {
        Stop::Failed(e)
    }
}

/// Timing and policy copied out of [`SimConfig`] when the task is built.
#[derive(Copy, Clone, Debug)]
struct Timing {
    scale:            TimeScale,
    loading_units:    u64,
    delivering_units: u64,
    policy:           InterruptPolicy,
    kick_on_return:   bool,
}

/// A claimed batch and everything needed to fly it.
///
/// The drone is already `Loading` with the batch attached when the task is
/// created (the allocation pass claimed it atomically).  From then on the
/// task is the only writer of this drone's phase and position and of its
/// orders' states, so it never races the allocation side.
pub struct DeliveryTask {
    pub drone:    DroneId,
    pub route:    RouteId,
    /// Stops in flown order.
    pub sequence: Vec<Order>,

    drones:   Arc<DroneRegistry>,
    orders:   Arc<OrderStore>,
    routes:   Arc<RouteStore>,
    observer: Arc<dyn DeliveryObserver>,
    cancel:   watch::Receiver<bool>,
    kick:     Arc<Notify>,
    timing:   Timing,

    delivered: usize,
}

impl DeliveryTask {
    /// Build the task for a batch the engine just committed.
    pub fn new<P: RoutePlanner>(
        allocation: &Allocation,
        config:     &SimConfig,
        engine:     &AllocationEngine<P>,
        observer:   Arc<dyn DeliveryObserver>,
        cancel:     watch::Receiver<bool>,
        kick:       Arc<Notify>,
    ) -> Self {
        Self {
            drone:    allocation.drone,
            route:    allocation.route,
            sequence: allocation.sequence.clone(),
            drones:   Arc::clone(&engine.drones),
            orders:   Arc::clone(&engine.orders),
            routes:   Arc::clone(&engine.routes),
            observer,
            cancel,
            kick,
            timing: Timing {
                scale:            config.time_scale(),
                loading_units:    config.loading_units,
                delivering_units: config.delivering_units,
                policy:           config.interrupt_policy,
                kick_on_return:   config.reconcile_after_delivery,
            },
            delivered: 0,
        }
    }

    /// Fly the batch to completion or until cancelled.
    ///
    /// # Errors
    ///
    /// A store rejected a state update.  The drone and its orders are left
    /// as they were at the failing step.
    pub async fn run(mut self) -> SimResult<DeliveryOutcome> {
        let result = match self.fly().await {
            Ok(()) => {
                if self.timing.kick_on_return {
                    self.kick.notify_one();
                }
                Ok(DeliveryOutcome::Completed { delivered: self.delivered })
            }
            Err(Stop::Cancelled) => self.interrupted(),
            Err(Stop::Failed(e)) => Err(e),
        };
        result.map_err(|e| {
            error!(drone = %self.drone, route = %self.route, error = %e, "delivery state update rejected");
            e.into()
        })
    }

    // ── Phases ────────────────────────────────────────────────────────────

    async fn fly(&mut self) -> Result<(), Stop> {
        let start = self.drones.get(self.drone)?.position;
        self.announce(DroneStatus::Loading, start);
        self.hold(self.timing.loading_units).await?;

        for order in &self.sequence {
            self.orders.update_state(order.id, OrderState::OnRoute)?;
            self.drones.mark(self.drone, order.id, OrderState::OnRoute)?;
        }
        self.routes.update_status(self.route, RouteStatus::InProgress)?;

        let sequence = std::mem::take(&mut self.sequence);
        let flight = legs(&sequence, start);
        let (outbound, inbound) = flight.split_at(sequence.len());
        for (order, leg) in sequence.iter().zip(outbound) {
            self.enter(DroneStatus::InFlight, leg.from)?;
            self.hold(leg.travel_units()).await?;
            self.drones.move_to(self.drone, leg.to)?;

            self.enter(DroneStatus::Delivering, leg.to)?;
            self.hold(self.timing.delivering_units).await?;
            let delivered = self.orders.update_state(order.id, OrderState::Delivered)?;
            self.drones.detach(self.drone, order.id)?;
            self.delivered += 1;
            info!(drone = %self.drone, order = %order.id, at = %leg.to, "order delivered");
            self.observer.on_delivered(self.drone, &delivered);
        }
        self.sequence = sequence;

        for leg in inbound {
            self.enter(DroneStatus::Returning, leg.from)?;
            self.hold(leg.travel_units()).await?;
            self.drones.move_to(self.drone, leg.to)?;
        }
        self.enter(DroneStatus::Idle, BASE)?;

        let route = self.routes.update_status(self.route, RouteStatus::Completed)?;
        info!(drone = %self.drone, route = %self.route, delivered = self.delivered, "batch complete");
        self.observer.on_batch_complete(self.drone, &route);
        Ok(())
    }

    fn enter(&self, status: DroneStatus, position: GridPoint) -> Result<(), Stop> {
        self.drones.set_status(self.drone, status)?;
        self.announce(status, position);
        Ok(())
    }

    fn announce(&self, status: DroneStatus, position: GridPoint) {
        info!(drone = %self.drone, status = %status, position = %position, "drone phase");
        self.observer.on_phase(self.drone, status, position);
    }

    /// Suspend for `units`, or stop early if cancellation is signalled.
    async fn hold(&mut self, units: u64) -> Result<(), Stop> {
        let delay = self.timing.scale.duration(units);
        tokio::select! {
            biased;
            _ = cancelled(&mut self.cancel) => Err(Stop::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    // ── Interruption ──────────────────────────────────────────────────────

    fn interrupted(&self) -> DdResult<DeliveryOutcome> {
        let delivered = self.delivered;
        let drone = self.drones.get(self.drone)?;
        match self.timing.policy {
            InterruptPolicy::Abandon => {
                warn!(
                    drone       = %self.drone,
                    route       = %self.route,
                    at          = %drone.position,
                    delivered,
                    undelivered = drone.assigned.len(),
                    "delivery interrupted; state left as is"
                );
                self.observer.on_interrupted(self.drone, self.route, drone.position, &drone.assigned);
                Ok(DeliveryOutcome::Interrupted { delivered, requeued: 0 })
            }
            InterruptPolicy::Compensate => {
                let requeued = self
                    .drones
                    .reset(self.drone)?
                    .iter()
                    .map(|order| self.orders.requeue(order.id))
                    .collect::<DdResult<Vec<Order>>>()?;
                self.routes.update_status(self.route, RouteStatus::Aborted)?;
                warn!(
                    drone    = %self.drone,
                    route    = %self.route,
                    at       = %drone.position,
                    delivered,
                    requeued = requeued.len(),
                    "delivery interrupted; orders requeued and drone reset"
                );
                self.observer.on_interrupted(self.drone, self.route, drone.position, &requeued);
                Ok(DeliveryOutcome::Interrupted { delivered, requeued: requeued.len() })
            }
        }
    }
}
