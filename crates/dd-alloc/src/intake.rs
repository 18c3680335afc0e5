//! Order submission.
//!
//! A new order is checked once against every drone's *declared* capability,
//! as if it were flown alone from base and back.  If no drone could ever
//! carry it the order is born `Refused`; otherwise it enters the pool as
//! `Pending`.  The decision ignores current fleet availability and is never
//! revisited.

use tracing::{info, warn};

use dd_core::{DdResult, OrderState};
use dd_fleet::{NewOrder, Order};
use dd_route::RoutePlanner;

use crate::AllocationEngine;

impl<P: RoutePlanner> AllocationEngine<P> {
    /// Would any drone in the fleet be able to carry `request` on its own?
    pub fn is_deliverable(&self, request: &NewOrder) -> bool {
        self.drones
            .specs()
            .iter()
            .any(|(_, spec)| spec.can_ever_carry(request.destination, request.payload_kg))
    }

    /// Validate and store a new order, deciding `Pending` vs `Refused`.
    ///
    /// # Errors
    ///
    /// `InvalidOrder` if the payload is not strictly positive.
    pub fn submit(&self, request: NewOrder) -> DdResult<Order> {
        request.validate()?;

        let state = if self.is_deliverable(&request) {
            OrderState::Pending
        } else {
            OrderState::Refused
        };

        let order = self.orders.save(Order::new(self.orders.allocate_id(), request, state))?;
        match state {
            OrderState::Refused => warn!(
                order       = %order.id,
                destination = %order.destination,
                payload_kg  = order.payload_kg,
                "no drone can ever carry this order; refused"
            ),
            _ => info!(
                order       = %order.id,
                destination = %order.destination,
                payload_kg  = order.payload_kg,
                priority    = %order.priority,
                "order accepted"
            ),
        }
        Ok(order)
    }
}
