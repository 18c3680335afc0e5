//! Entity types.

use serde::{Deserialize, Serialize};

use dd_core::{
    BASE, DdError, DdResult, DroneId, DroneStatus, GridPoint, OrderId, OrderState, Priority,
    RouteId, RouteStatus,
};
use dd_route::Waypoint;

use crate::{DroneSummary, OrderSummary};

// ── Drone ─────────────────────────────────────────────────────────────────────

/// Declared capability of a drone.  Immutable once the drone is registered.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DroneSpec {
    pub max_payload_kg: f64,
    pub max_range_km:   f64,
}

impl DroneSpec {
    pub fn new(max_payload_kg: f64, max_range_km: f64) -> Self {
        Self { max_payload_kg, max_range_km }
    }

    /// Could this drone carry `order` alone, base → destination → base?
    pub fn can_ever_carry(&self, destination: GridPoint, payload_kg: f64) -> bool {
        payload_kg <= self.max_payload_kg
            && BASE.distance_to(destination) * 2.0 <= self.max_range_km
    }
}

/// A drone as seen through a registry snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Drone {
    pub id:       DroneId,
    pub spec:     DroneSpec,
    pub status:   DroneStatus,
    pub position: GridPoint,
    /// Orders currently on board, in attachment order.
    pub assigned: Vec<Order>,
}

impl Drone {
    /// A fresh drone: idle, empty, parked at base.
    pub fn new(id: DroneId, spec: DroneSpec) -> Self {
        Self {
            id,
            spec,
            status:   DroneStatus::Idle,
            position: BASE,
            assigned: Vec::new(),
        }
    }

    /// Total payload currently on board.
    pub fn load_kg(&self) -> f64 {
        self.assigned.iter().map(|o| o.payload_kg).sum()
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.status.is_idle()
    }

    /// Idle with nothing on board, so a batch can be claimed.
    pub fn is_available(&self) -> bool {
        self.is_idle() && self.assigned.is_empty()
    }

    pub fn summary(&self) -> DroneSummary {
        DroneSummary {
            id:             self.id,
            max_payload_kg: self.spec.max_payload_kg,
            max_range_km:   self.spec.max_range_km,
        }
    }
}

// ── Order ─────────────────────────────────────────────────────────────────────

/// An intake request, before an ID or state has been assigned.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub destination: GridPoint,
    pub payload_kg:  f64,
    #[serde(default)]
    pub priority:    Priority,
}

impl NewOrder {
    pub fn new(x: i32, y: i32, payload_kg: f64, priority: Priority) -> Self {
        Self { destination: GridPoint::new(x, y), payload_kg, priority }
    }

    /// Reject non-positive (or non-finite) payloads.
    pub fn validate(&self) -> DdResult<()> {
        if self.payload_kg.is_finite() && self.payload_kg > 0.0 {
            Ok(())
        } else {
            Err(DdError::InvalidOrder(format!(
                "payload must be greater than zero, got {}",
                self.payload_kg
            )))
        }
    }
}

/// A delivery order.  Geometry and weight never change after creation; only
/// `state` moves.  Equality is by `id` alone.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id:          OrderId,
    pub destination: GridPoint,
    pub payload_kg:  f64,
    pub priority:    Priority,
    pub state:       OrderState,
}

impl Order {
    pub fn new(id: OrderId, request: NewOrder, state: OrderState) -> Self {
        Self {
            id,
            destination: request.destination,
            payload_kg:  request.payload_kg,
            priority:    request.priority,
            state,
        }
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            id:         self.id,
            x:          self.destination.x,
            y:          self.destination.y,
            payload_kg: self.payload_kg,
            priority:   self.priority,
        }
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Order {}

impl std::hash::Hash for Order {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Waypoint for Order {
    #[inline]
    fn position(&self) -> GridPoint {
        self.destination
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// One dispatched batch: which drone, which orders in flown sequence, and how
/// far the feasibility check estimated the trip to be.
///
/// Only `status` ever changes after creation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub id:                RouteId,
    pub drone:             DroneSummary,
    pub total_distance_km: f64,
    pub status:            RouteStatus,
    pub orders:            Vec<OrderSummary>,
}
