//! Simulator error type.
//!
//! Sub-crates define their own error enums and wrap `DdError` as one variant
//! via `#[from]`, so store-level failures propagate with `?` unchanged.
//!
//! Allocation incompatibility and creation-time refusal are *not* errors;
//! they are ordinary outcomes reported through return values.

use thiserror::Error;

use crate::{DroneId, OrderId, RouteId};

/// The base error type shared by every `dd-*` crate.
#[derive(Debug, Error, PartialEq)]
pub enum DdError {
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("drone {0} not found")]
    DroneNotFound(DroneId),

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("route {0} not found")]
    RouteNotFound(RouteId),

    #[error("drone {0} is not idle")]
    DroneUnavailable(DroneId),

    #[error("illegal {entity} transition {from} -> {to}")]
    InvalidStatusTransition {
        entity: &'static str,
        from:   &'static str,
        to:     &'static str,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `dd-*` crates.
pub type DdResult<T> = Result<T, DdError>;
