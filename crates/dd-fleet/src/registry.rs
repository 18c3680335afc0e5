//! The `DroneRegistry`: every drone behind its own lock.
//!
//! # Locking model
//!
//! The map itself is fixed at construction (fleets do not grow at runtime),
//! so it needs no lock; each entry is a `parking_lot::Mutex<Drone>`.  All
//! mutations of one drone are therefore serialised, while different drones
//! progress fully in parallel.
//!
//! [`claim`][DroneRegistry::claim] is the single operation that takes a drone
//! out of `Idle`: it checks the status, attaches the whole batch and moves the
//! drone to `Loading` under one lock acquisition.  A concurrent allocation
//! pass can therefore never see the drone idle with orders half-attached.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use dd_core::{BASE, DdError, DdResult, DroneId, DroneStatus, GridPoint, OrderId, OrderState};

use crate::{Drone, DroneSpec, DroneView, Order};

pub struct DroneRegistry {
    drones: BTreeMap<DroneId, Mutex<Drone>>,
}

impl DroneRegistry {
    /// Register one drone per spec, with IDs counting up from `DroneId::FIRST`.
    pub fn new(specs: impl IntoIterator<Item = DroneSpec>) -> Self {
        let mut drones = BTreeMap::new();
        let mut id = DroneId::FIRST;
        for spec in specs {
            drones.insert(id, Mutex::new(Drone::new(id, spec)));
            id = id.next();
        }
        Self { drones }
    }

    pub fn len(&self) -> usize {
        self.drones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drones.is_empty()
    }

    /// All drone IDs in registry iteration order (ascending).
    pub fn ids(&self) -> impl Iterator<Item = DroneId> + '_ {
        self.drones.keys().copied()
    }

    /// Declared capabilities of every drone.  Never changes, so no snapshot
    /// semantics are needed beyond the copy.
    pub fn specs(&self) -> Vec<(DroneId, DroneSpec)> {
        self.drones.iter().map(|(&id, d)| (id, d.lock().spec)).collect()
    }

    fn slot(&self, id: DroneId) -> DdResult<&Mutex<Drone>> {
        self.drones.get(&id).ok_or(DdError::DroneNotFound(id))
    }

    // ── Snapshots ─────────────────────────────────────────────────────────

    /// Owned copy of one drone.
    pub fn get(&self, id: DroneId) -> DdResult<Drone> {
        Ok(self.slot(id)?.lock().clone())
    }

    /// Owned copies of every drone, in registry order.
    pub fn snapshot(&self) -> Vec<Drone> {
        self.drones.values().map(|d| d.lock().clone()).collect()
    }

    /// Owned copies of the drones that are idle with nothing on board.
    pub fn idle(&self) -> Vec<Drone> {
        self.drones
            .values()
            .filter_map(|d| {
                let drone = d.lock();
                drone.is_available().then(|| drone.clone())
            })
            .collect()
    }

    /// Read-side projection: `{id, capacity, range, status}` per drone.
    pub fn views(&self) -> Vec<DroneView> {
        self.drones.values().map(|d| DroneView::from(&*d.lock())).collect()
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Attach a single order to an idle drone without changing its status.
    ///
    /// The drone cannot be claimed again until the order is detached.
    ///
    /// # Errors
    ///
    /// `DroneNotFound`, or `DroneUnavailable` if the drone is not idle.
    pub fn attach(&self, id: DroneId, order: Order) -> DdResult<()> {
        let mut drone = self.slot(id)?.lock();
        if !drone.is_idle() {
            return Err(DdError::DroneUnavailable(id));
        }
        drone.assigned.push(order);
        Ok(())
    }

    /// Atomically attach `batch` to an idle drone and move it to `Loading`.
    ///
    /// Returns a snapshot of the drone as claimed.
    ///
    /// # Errors
    ///
    /// `DroneNotFound`; `DroneUnavailable` if the drone left `Idle` since the
    /// caller's snapshot or still carries attached orders; `InvalidOrder` for
    /// an empty batch.  On error nothing is changed.
    pub fn claim(&self, id: DroneId, batch: Vec<Order>) -> DdResult<Drone> {
        if batch.is_empty() {
            return Err(DdError::InvalidOrder(format!("empty batch for {id}")));
        }
        let mut drone = self.slot(id)?.lock();
        if !drone.is_available() {
            return Err(DdError::DroneUnavailable(id));
        }
        let next = drone.status.transition(DroneStatus::Loading)?;
        drone.assigned.extend(batch);
        drone.status = next;
        debug_assert!(drone.load_kg() <= drone.spec.max_payload_kg);
        Ok(drone.clone())
    }

    /// Step the drone to the successor of its current phase.
    pub fn advance(&self, id: DroneId) -> DdResult<DroneStatus> {
        let mut drone = self.slot(id)?.lock();
        let next = drone.status.next();
        drone.status = next;
        Ok(next)
    }

    /// Move the drone to `to`, validated against the transition table.
    pub fn set_status(&self, id: DroneId, to: DroneStatus) -> DdResult<DroneStatus> {
        let mut drone = self.slot(id)?.lock();
        drone.status = drone.status.transition(to)?;
        Ok(drone.status)
    }

    /// Update the drone's position.
    pub fn move_to(&self, id: DroneId, position: GridPoint) -> DdResult<()> {
        self.slot(id)?.lock().position = position;
        Ok(())
    }

    /// Record `state` on the drone's copy of an order it carries, keeping the
    /// assigned list in step with the order store.
    ///
    /// # Errors
    ///
    /// `DroneNotFound`, or `OrderNotFound` if the order is not on board.
    pub fn mark(&self, id: DroneId, order: OrderId, state: OrderState) -> DdResult<()> {
        let mut drone = self.slot(id)?.lock();
        let carried = drone
            .assigned
            .iter_mut()
            .find(|o| o.id == order)
            .ok_or(DdError::OrderNotFound(order))?;
        carried.state = state;
        Ok(())
    }

    /// Remove one order from the drone's assigned list.
    ///
    /// # Errors
    ///
    /// `DroneNotFound`, or `OrderNotFound` if the order is not on board.
    pub fn detach(&self, id: DroneId, order: OrderId) -> DdResult<Order> {
        let mut drone = self.slot(id)?.lock();
        let idx = drone
            .assigned
            .iter()
            .position(|o| o.id == order)
            .ok_or(DdError::OrderNotFound(order))?;
        Ok(drone.assigned.remove(idx))
    }

    /// Force a drone back to `Idle` at base, returning whatever was still on
    /// board.
    ///
    /// This bypasses the transition table and exists only for recovering a
    /// drone whose delivery was interrupted.
    pub fn reset(&self, id: DroneId) -> DdResult<Vec<Order>> {
        let mut drone = self.slot(id)?.lock();
        drone.status = DroneStatus::Idle;
        drone.position = BASE;
        Ok(std::mem::take(&mut drone.assigned))
    }
}
