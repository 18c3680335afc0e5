//! `dd-fleet`: the shared mutable state of the simulator.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`model`]    | `Drone`, `DroneSpec`, `Order`, `NewOrder`, `Route`            |
//! | [`registry`] | `DroneRegistry`: per-drone locks, atomic claim/advance/detach  |
//! | [`orders`]   | `OrderStore`: order states, priority-ordered pending view     |
//! | [`routes`]   | `RouteStore`: one record per dispatched batch                 |
//! | [`view`]     | `DroneView`, `DroneSummary`, `OrderSummary`, `Statistics`     |
//!
//! # Ownership
//!
//! The registry exclusively owns drone state and the order store exclusively
//! owns order state.  Neither hands out references into its collections;
//! every read returns an owned snapshot taken under the lock, so callers
//! never observe a half-applied mutation.

pub mod model;
pub mod orders;
pub mod registry;
pub mod routes;
pub mod view;


pub use model::{Drone, DroneSpec, NewOrder, Order, Route};
pub use orders::OrderStore;
pub use registry::DroneRegistry;
pub use routes::RouteStore;
pub use view::{DroneSummary, DroneView, OrderSummary, Statistics};
