//! `dd-core`: foundational types for the drone dispatch simulator.
//!
//! This crate is a dependency of every other `dd-*` crate.  It has no `dd-*`
//! dependencies and only `thiserror` (plus optional `serde`) from outside.
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `DroneId`, `OrderId`, `RouteId`                            |
//! | [`geo`]         | `GridPoint`, `distance`, the home base                     |
//! | [`status`]      | `DroneStatus`, `OrderState`, `RouteStatus`, `Priority`     |
//! | [`time`]        | `TimeScale`: simulated time units → wall-clock durations   |
//! | [`error`]       | `DdError`, `DdResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod status;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{DdError, DdResult};
pub use geo::{BASE, GridPoint, distance};
pub use ids::{DroneId, OrderId, RouteId};
pub use status::{DroneStatus, OrderState, Priority, RouteStatus};
pub use time::TimeScale;
