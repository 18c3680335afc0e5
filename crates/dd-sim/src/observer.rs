//! Delivery observer trait for progress reporting and data collection.

use tracing::debug;

use dd_alloc::PassOutcome;
use dd_core::{DroneId, DroneStatus, GridPoint, RouteId};
use dd_fleet::{Order, Route};

/// Callbacks invoked by the dispatcher and by every delivery task.
///
/// Tasks run concurrently, so hooks take `&self` and may be called from
/// several threads at once; implementors needing state use interior
/// mutability.  All methods default to no-ops.
///
/// # Example: delivered counter
///
/// ```rust,ignore
/// struct Counter(AtomicUsize);
///
/// impl DeliveryObserver for Counter {
///     fn on_delivered(&self, _drone: DroneId, _order: &Order) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait DeliveryObserver: Send + Sync {
    /// After every allocation pass, including passes that allocated nothing.
    fn on_pass(&self, _outcome: &PassOutcome) {}

    /// After a drone entered `status`.  `position` is where it is now.
    fn on_phase(&self, _drone: DroneId, _status: DroneStatus, _position: GridPoint) {}

    /// After `order` was marked delivered and taken off the drone.
    fn on_delivered(&self, _drone: DroneId, _order: &Order) {}

    /// After the drone is back at base and `route` is completed.
    fn on_batch_complete(&self, _drone: DroneId, _route: &Route) {}

    /// After a cancelled task applied its interrupt policy.  `at` is the last
    /// point the drone reached; `undelivered` holds the orders that were
    /// still on board, in their state after the policy ran.
    fn on_interrupted(&self, _drone: DroneId, _route: RouteId, _at: GridPoint, _undelivered: &[Order]) {}
}

/// A [`DeliveryObserver`] that does nothing.
pub struct NoopObserver;

impl DeliveryObserver for NoopObserver {}

/// Mirrors every hook as a `debug` event under this module's target.
pub struct TracingObserver;

impl DeliveryObserver for TracingObserver {
    fn on_pass(&self, outcome: &PassOutcome) {
        debug!(
            idle        = outcome.idle_drones,
            allocations = outcome.allocations.len(),
            pending     = outcome.still_pending,
            "pass observed"
        );
    }

    fn on_phase(&self, drone: DroneId, status: DroneStatus, position: GridPoint) {
        debug!(drone = %drone, status = %status, position = %position, "phase observed");
    }

    fn on_delivered(&self, drone: DroneId, order: &Order) {
        debug!(drone = %drone, order = %order.id, destination = %order.destination, "delivery observed");
    }

    fn on_batch_complete(&self, drone: DroneId, route: &Route) {
        debug!(drone = %drone, route = %route.id, stops = route.orders.len(), "batch observed");
    }

    fn on_interrupted(&self, drone: DroneId, route: RouteId, at: GridPoint, undelivered: &[Order]) {
        debug!(drone = %drone, route = %route, at = %at, undelivered = undelivered.len(), "interruption observed");
    }
}
