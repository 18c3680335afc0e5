//! The `RouteStore`: one immutable-shape record per dispatched batch.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use dd_core::{DdError, DdResult, RouteId, RouteStatus};

use crate::{Drone, Order, Route};

struct Inner {
    routes:  BTreeMap<RouteId, Route>,
    next_id: RouteId,
}

pub struct RouteStore {
    inner: RwLock<Inner>,
}

impl Default for RouteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner { routes: BTreeMap::new(), next_id: RouteId::FIRST }),
        }
    }

    /// Record a `Planned` route for `drone` carrying `orders` in flown order.
    ///
    /// # Errors
    ///
    /// `InvalidOrder` if `orders` is empty, since a route needs at least one stop.
    pub fn create(&self, drone: &Drone, orders: &[Order], total_distance_km: f64) -> DdResult<Route> {
        if orders.is_empty() {
            return Err(DdError::InvalidOrder(format!(
                "{} must carry at least one order to form a route",
                drone.id
            )));
        }
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id = id.next();
        let route = Route {
            id,
            drone: drone.summary(),
            total_distance_km,
            status: RouteStatus::Planned,
            orders: orders.iter().map(Order::summary).collect(),
        };
        inner.routes.insert(id, route.clone());
        Ok(route)
    }

    pub fn get(&self, id: RouteId) -> DdResult<Route> {
        self.inner.read().routes.get(&id).cloned().ok_or(DdError::RouteNotFound(id))
    }

    /// Snapshot of every route in creation order.
    pub fn find_all(&self) -> Vec<Route> {
        self.inner.read().routes.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().routes.is_empty()
    }

    /// # Errors
    ///
    /// `RouteNotFound`, or `InvalidStatusTransition` for a backward move.
    pub fn update_status(&self, id: RouteId, to: RouteStatus) -> DdResult<Route> {
        let mut inner = self.inner.write();
        let route = inner.routes.get_mut(&id).ok_or(DdError::RouteNotFound(id))?;
        route.status = route.status.transition(to)?;
        Ok(route.clone())
    }
}
