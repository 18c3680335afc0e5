//! Lifecycle enums shared by the registry, the stores and the simulator.
//!
//! Every enum here is a closed set with an explicit transition table.  The
//! tables are pure functions so they can be tested without any entity; the
//! stores consult them before every mutation and reject anything else with
//! [`DdError::InvalidStatusTransition`][crate::DdError::InvalidStatusTransition].

use std::fmt;

use crate::{DdError, DdResult};

// ── DroneStatus ───────────────────────────────────────────────────────────────

/// Operational phase of a drone.
///
/// The canonical cycle is
/// `Idle → Loading → InFlight → Delivering → Returning → Idle`.
/// A batch with several stops loops `Delivering → InFlight` once per extra
/// stop before returning.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DroneStatus {
    /// At base, empty, accepting orders.
    #[default]
    Idle,
    /// Claimed by an allocation pass; orders are being loaded.
    Loading,
    /// Travelling to the next destination.
    InFlight,
    /// Hovering at a destination, handing over an order.
    Delivering,
    /// Flying back to base after the last stop.
    Returning,
}

impl DroneStatus {
    /// The successor in the canonical cycle.  Total over all variants.
    pub fn next(self) -> Self {
        match self {
            DroneStatus::Idle       => DroneStatus::Loading,
            DroneStatus::Loading    => DroneStatus::InFlight,
            DroneStatus::InFlight   => DroneStatus::Delivering,
            DroneStatus::Delivering => DroneStatus::Returning,
            DroneStatus::Returning  => DroneStatus::Idle,
        }
    }

    /// `true` if `self → to` is a legal single step.
    pub fn can_transition_to(self, to: DroneStatus) -> bool {
        to == self.next()
            || matches!((self, to), (DroneStatus::Delivering, DroneStatus::InFlight))
    }

    /// Validate `self → to`, returning the new status.
    pub fn transition(self, to: DroneStatus) -> DdResult<DroneStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(DdError::InvalidStatusTransition {
                entity: "drone",
                from:   self.as_str(),
                to:     to.as_str(),
            })
        }
    }

    #[inline]
    pub fn is_idle(self) -> bool {
        self == DroneStatus::Idle
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DroneStatus::Idle       => "IDLE",
            DroneStatus::Loading    => "LOADING",
            DroneStatus::InFlight   => "IN_FLIGHT",
            DroneStatus::Delivering => "DELIVERING",
            DroneStatus::Returning  => "RETURNING",
        }
    }
}

// ── OrderState ────────────────────────────────────────────────────────────────

/// Lifecycle of an order.
///
/// Forward-only along `Pending → Allocated → OnRoute → Delivered`, or the
/// one-shot `Pending → Refused` decided at submission.  `Delivered` and
/// `Refused` are terminal.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderState {
    #[default]
    Pending,
    Allocated,
    OnRoute,
    Delivered,
    Refused,
}

impl OrderState {
    /// Position along the delivery chain; `None` for `Refused`, which sits
    /// outside it.
    fn rank(self) -> Option<u8> {
        match self {
            OrderState::Pending   => Some(0),
            OrderState::Allocated => Some(1),
            OrderState::OnRoute   => Some(2),
            OrderState::Delivered => Some(3),
            OrderState::Refused   => None,
        }
    }

    /// `true` if `to` is the immediate successor of `self` on the delivery
    /// chain, or the single `Pending → Refused` step.  Skipping a state is
    /// never legal.
    pub fn can_transition_to(self, to: OrderState) -> bool {
        match (self.rank(), to.rank()) {
            (Some(from), Some(to)) => to == from + 1,
            (Some(0), None)        => true,
            _                      => false,
        }
    }

    pub fn transition(self, to: OrderState) -> DdResult<OrderState> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(DdError::InvalidStatusTransition {
                entity: "order",
                from:   self.as_str(),
                to:     to.as_str(),
            })
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderState::Delivered | OrderState::Refused)
    }

    /// `true` while the order is attached to a drone but not yet delivered.
    #[inline]
    pub fn is_in_flight(self) -> bool {
        matches!(self, OrderState::Allocated | OrderState::OnRoute)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderState::Pending   => "PENDING",
            OrderState::Allocated => "ALLOCATED",
            OrderState::OnRoute   => "ON_ROUTE",
            OrderState::Delivered => "DELIVERED",
            OrderState::Refused   => "REFUSED",
        }
    }
}

// ── RouteStatus ───────────────────────────────────────────────────────────────

/// Lifecycle of a route record: `Planned → InProgress → Completed`, or
/// `Aborted` from either live state when a delivery is interrupted.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RouteStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Aborted,
}

impl RouteStatus {
    pub fn can_transition_to(self, to: RouteStatus) -> bool {
        matches!(
            (self, to),
            (RouteStatus::Planned, RouteStatus::InProgress)
                | (RouteStatus::InProgress, RouteStatus::Completed)
                | (RouteStatus::Planned | RouteStatus::InProgress, RouteStatus::Aborted)
        )
    }

    pub fn transition(self, to: RouteStatus) -> DdResult<RouteStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(DdError::InvalidStatusTransition {
                entity: "route",
                from:   self.as_str(),
                to:     to.as_str(),
            })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteStatus::Planned    => "PLANNED",
            RouteStatus::InProgress => "IN_PROGRESS",
            RouteStatus::Completed  => "COMPLETED",
            RouteStatus::Aborted    => "ABORTED",
        }
    }
}

// ── Priority ──────────────────────────────────────────────────────────────────

/// Order priority.  Only used to order the pending pool: `Low < Medium < High`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low    => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High   => "HIGH",
        }
    }
}

// ── Display ───────────────────────────────────────────────────────────────────

macro_rules! display_as_str {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )*};
}

display_as_str!(DroneStatus, OrderState, RouteStatus, Priority);
