//! Read-side projections and the statistics fold.
//!
//! Everything here is plain data built from snapshots; nothing holds a lock
//! or a reference back into the stores.

use serde::Serialize;

use dd_core::{DroneId, DroneStatus, OrderId, OrderState, Priority};

use crate::{Drone, Order, Route};

/// `{id, capacity, range, status}` for one drone.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct DroneView {
    pub id:             DroneId,
    pub max_payload_kg: f64,
    pub max_range_km:   f64,
    pub status:         DroneStatus,
}

impl From<&Drone> for DroneView {
    fn from(drone: &Drone) -> Self {
        Self {
            id:             drone.id,
            max_payload_kg: drone.spec.max_payload_kg,
            max_range_km:   drone.spec.max_range_km,
            status:         drone.status,
        }
    }
}

/// Drone identity and capability, as embedded in a route.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct DroneSummary {
    pub id:             DroneId,
    pub max_payload_kg: f64,
    pub max_range_km:   f64,
}

/// Order geometry and weight, as embedded in a route.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct OrderSummary {
    pub id:         OrderId,
    pub x:          i32,
    pub y:          i32,
    pub payload_kg: f64,
    pub priority:   Priority,
}

/// Fleet-wide counters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Statistics {
    pub total_routes:             usize,
    pub average_orders_per_route: f64,
    pub total_orders_completed:   usize,
    pub drones_available:         usize,
}

impl Statistics {
    /// Fold the three read-side snapshots into counters.
    ///
    /// Empty inputs yield `0, 0.0, 0, 0`.
    pub fn compute(routes: &[Route], orders: &[Order], drones: &[DroneView]) -> Self {
        let total_routes = routes.len();
        let average_orders_per_route = if total_routes == 0 {
            0.0
        } else {
            routes.iter().map(|r| r.orders.len()).sum::<usize>() as f64 / total_routes as f64
        };
        Self {
            total_routes,
            average_orders_per_route,
            total_orders_completed: orders.iter().filter(|o| o.state == OrderState::Delivered).count(),
            drones_available:       drones.iter().filter(|d| d.status.is_idle()).count(),
        }
    }
}
