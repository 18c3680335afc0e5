//! The allocation engine.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use dd_core::{DdError, DdResult, DroneId, OrderState, RouteId};
use dd_fleet::{Drone, DroneRegistry, Order, OrderStore, RouteStore};
use dd_route::RoutePlanner;

/// A batch committed to one drone by an allocation pass.
#[derive(Clone, Debug)]
pub struct Allocation {
    pub drone:    DroneId,
    pub route:    RouteId,
    /// The batch in the order it will be flown.
    pub sequence: Vec<Order>,
}

/// What one pass did.
#[derive(Clone, Debug, Default)]
pub struct PassOutcome {
    /// Idle drones seen at the start of the pass.
    pub idle_drones:   usize,
    /// Orders still pending after the pass.
    pub still_pending: usize,
    /// One entry per drone that received at least one order.
    pub allocations:   Vec<Allocation>,
}

/// Shares the fleet stores with the delivery side and owns the planner.
///
/// # Type parameter
///
/// `P` must implement [`RoutePlanner`] (e.g.
/// [`dd_route::NearestNeighborPlanner`]).  Swap it at compile time for a
/// different heuristic with no runtime overhead.
pub struct AllocationEngine<P: RoutePlanner> {
    pub planner: P,
    pub drones:  Arc<DroneRegistry>,
    pub orders:  Arc<OrderStore>,
    pub routes:  Arc<RouteStore>,
    /// Serialises passes so the pick/check/commit/remove cycle over the
    /// pending pool is atomic with respect to other passes.
    pass_lock:   Mutex<()>,
}

impl<P: RoutePlanner> AllocationEngine<P> {
    pub fn new(
        planner: P,
        drones:  Arc<DroneRegistry>,
        orders:  Arc<OrderStore>,
        routes:  Arc<RouteStore>,
    ) -> Self {
        Self { planner, drones, orders, routes, pass_lock: Mutex::new(()) }
    }

    /// Can `drone` take `candidate` on top of what it already carries and
    /// what this pass has provisionally given it?
    ///
    /// Checks total payload against capacity, then the round-trip distance
    /// from the drone's current position against range.
    pub fn is_compatible(&self, drone: &Drone, candidate: &Order, provisional: &[Order]) -> bool {
        let combined: Vec<&Order> = drone
            .assigned
            .iter()
            .chain(provisional)
            .chain(std::iter::once(candidate))
            .collect();

        let payload: f64 = combined.iter().map(|o| o.payload_kg).sum();
        if payload > drone.spec.max_payload_kg {
            return false;
        }
        self.planner.route_distance(&combined, drone.position) <= drone.spec.max_range_km
    }

    /// Run `read` while no allocation pass is in progress.
    ///
    /// A pass touches all three stores; reading them here never sees a batch
    /// claimed by a drone but not yet marked allocated or recorded as a
    /// route.  Delivery tasks keep running, so a step of an in-flight batch
    /// may still land between two store reads.
    pub fn between_passes<R>(&self, read: impl FnOnce() -> R) -> R {
        let _pass = self.pass_lock.lock();
        read()
    }

    /// Run one allocation pass over the current idle drones and pending pool.
    ///
    /// # Errors
    ///
    /// Propagates a store error if committing an order fails, which can only
    /// happen if some other code path moved a pending order behind the
    /// engine's back.
    pub fn run_pass(&self) -> DdResult<PassOutcome> {
        let _pass = self.pass_lock.lock();

        let idle = self.drones.idle();
        let mut pool = self.orders.find_pending();
        let mut outcome = PassOutcome { idle_drones: idle.len(), ..PassOutcome::default() };

        for drone in idle {
            if pool.is_empty() {
                break;
            }

            let mut batch: Vec<Order> = Vec::new();
            for candidate in &pool {
                if self.is_compatible(&drone, candidate, &batch) {
                    batch.push(candidate.clone());
                }
            }
            if batch.is_empty() {
                debug!(drone = %drone.id, pending = pool.len(), "no compatible orders");
                continue;
            }

            pool.retain(|o| !batch.contains(o));
            if let Some(allocation) = self.commit(&drone, batch)? {
                outcome.allocations.push(allocation);
            }
        }

        outcome.still_pending = pool.len();
        Ok(outcome)
    }

    /// Claim the drone, mark the orders allocated and record the route.
    ///
    /// Returns `None` if the drone was no longer idle; its batch is simply
    /// left pending for the next pass.
    fn commit(&self, drone: &Drone, mut batch: Vec<Order>) -> DdResult<Option<Allocation>> {
        for order in &mut batch {
            order.state = OrderState::Allocated;
        }

        let claimed = match self.drones.claim(drone.id, batch.clone()) {
            Ok(d) => d,
            Err(DdError::DroneUnavailable(id)) => {
                warn!(drone = %id, "drone left idle before its batch was committed");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        for order in &batch {
            self.orders.update_state(order.id, OrderState::Allocated)?;
        }

        let distance = self.planner.route_distance(&claimed.assigned, drone.position);
        let sequence = self.planner.sequence(&batch);
        let route = self.routes.create(&claimed, &sequence, distance)?;

        info!(
            drone    = %drone.id,
            route    = %route.id,
            orders   = batch.len(),
            load_kg  = claimed.load_kg(),
            distance = format_args!("{distance:.2}"),
            "batch allocated"
        );

        Ok(Some(Allocation { drone: drone.id, route: route.id, sequence }))
    }
}
