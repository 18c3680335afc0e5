//! `dd-alloc`: matching pending orders to idle drones.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                        |
//! |------------|-----------------------------------------------------------------|
//! | [`engine`] | `AllocationEngine<P>`: compatibility check and allocation pass  |
//! | [`intake`] | Order submission with creation-time feasibility                 |
//!
//! # Allocation model (first-fit greedy)
//!
//! 1. Snapshot the idle drones (registry order) and the pending pool
//!    (priority order, FIFO within a priority).
//! 2. For each idle drone, scan the remaining pool and tentatively take every
//!    order that stays compatible with what the drone already carries plus
//!    what it has taken so far this pass.
//! 3. Commit the batch with [`DroneRegistry::claim`][dd_fleet::DroneRegistry::claim],
//!    mark each order `Allocated`, record a `Planned` route, and drop the
//!    batch from the pool so no later drone can take it.
//!
//! Earlier drones get first pick.  The result is order-dependent and not
//! globally optimal; that is intended.

pub mod engine;
pub mod intake;


pub use engine::{Allocation, AllocationEngine, PassOutcome};
