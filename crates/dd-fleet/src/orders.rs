//! The `OrderStore`: every order ever submitted and its current state.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use dd_core::{DdError, DdResult, OrderId, OrderState};

use crate::Order;

struct Inner {
    orders:  BTreeMap<OrderId, Order>,
    next_id: OrderId,
}

/// Holds all orders keyed by ID.
///
/// Reads take a shared lock and return owned copies; writes take the
/// exclusive lock for the whole read-modify-write, so two concurrent updates
/// to one order are serialised and the transition check always sees the
/// latest state.
pub struct OrderStore {
    inner: RwLock<Inner>,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner { orders: BTreeMap::new(), next_id: OrderId::FIRST }),
        }
    }

    /// Reserve the next order ID.
    pub fn allocate_id(&self) -> OrderId {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id = id.next();
        id
    }

    /// Store a newly created order.
    ///
    /// # Errors
    ///
    /// `InvalidOrder` if the ID is already taken or the order is neither
    /// `Pending` nor `Refused` (the only states an order can be born in).
    pub fn save(&self, order: Order) -> DdResult<Order> {
        if !matches!(order.state, OrderState::Pending | OrderState::Refused) {
            return Err(DdError::InvalidOrder(format!(
                "{} cannot be created in state {}",
                order.id, order.state
            )));
        }
        let mut inner = self.inner.write();
        if inner.orders.contains_key(&order.id) {
            return Err(DdError::InvalidOrder(format!("{} already exists", order.id)));
        }
        if order.id >= inner.next_id {
            inner.next_id = order.id.next();
        }
        inner.orders.insert(order.id, order.clone());
        Ok(order)
    }

    pub fn get(&self, id: OrderId) -> DdResult<Order> {
        self.inner.read().orders.get(&id).cloned().ok_or(DdError::OrderNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.inner.read().orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().orders.is_empty()
    }

    /// Snapshot of every order in submission order.
    pub fn find_all(&self) -> Vec<Order> {
        self.inner.read().orders.values().cloned().collect()
    }

    /// Snapshot of pending orders, highest priority first, then oldest first.
    pub fn find_pending(&self) -> Vec<Order> {
        let mut pending: Vec<Order> = self
            .inner
            .read()
            .orders
            .values()
            .filter(|o| o.state == OrderState::Pending)
            .cloned()
            .collect();
        // Stable sort over an ID-ordered input keeps FIFO within a priority.
        pending.sort_by(|a, b| b.priority.cmp(&a.priority));
        pending
    }

    /// Number of orders currently in `state`.
    pub fn count_in(&self, state: OrderState) -> usize {
        self.inner.read().orders.values().filter(|o| o.state == state).count()
    }

    /// Move order `id` forward to `to`.
    ///
    /// # Errors
    ///
    /// `OrderNotFound`, or `InvalidStatusTransition` unless `to` is the next
    /// state of the order lifecycle.
    pub fn update_state(&self, id: OrderId, to: OrderState) -> DdResult<Order> {
        let mut inner = self.inner.write();
        let order = inner.orders.get_mut(&id).ok_or(DdError::OrderNotFound(id))?;
        order.state = order.state.transition(to)?;
        Ok(order.clone())
    }

    /// Replace the stored order's state with `order.state`, matched by ID.
    pub fn update(&self, order: &Order) -> DdResult<Order> {
        self.update_state(order.id, order.state)
    }

    /// Return an attached-but-undelivered order to the pending pool.
    ///
    /// The only sanctioned backward move; used when a delivery is interrupted
    /// and compensated.
    ///
    /// # Errors
    ///
    /// `OrderNotFound`, or `InvalidStatusTransition` unless the order is
    /// `Allocated` or `OnRoute`.
    pub fn requeue(&self, id: OrderId) -> DdResult<Order> {
        let mut inner = self.inner.write();
        let order = inner.orders.get_mut(&id).ok_or(DdError::OrderNotFound(id))?;
        if !order.state.is_in_flight() {
            return Err(DdError::InvalidStatusTransition {
                entity: "order",
                from:   order.state.as_str(),
                to:     OrderState::Pending.as_str(),
            });
        }
        order.state = OrderState::Pending;
        Ok(order.clone())
    }
}
