//! `dd-route`: flight planning over grid waypoints.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`waypoint`] | `Waypoint` trait: anything with a grid position              |
//! | [`planner`]  | `RoutePlanner` trait, `NearestNeighborPlanner`, `Leg`        |
//!
//! # Two heuristics, on purpose
//!
//! The feasibility check and the executed flight use *different* orderings:
//!
//! - [`RoutePlanner::route_distance`] sorts stops once by distance from the
//!   start point and chains through them in that order.  Allocation compares
//!   this figure against a drone's range.
//! - [`RoutePlanner::sequence`] walks greedily from base, always taking the
//!   closest remaining stop.  This is the order a drone actually flies.
//!
//! Both close the loop with a mandatory leg back to [`dd_core::BASE`].

pub mod planner;
pub mod waypoint;

#[cfg(test)]
mod tests;

pub use planner::{Leg, NearestNeighborPlanner, RoutePlanner, legs};
pub use waypoint::Waypoint;
