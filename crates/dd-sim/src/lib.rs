//! `dd-sim`: the live side of the simulator.
//!
//! # Runtime shape
//!
//! ```text
//! Scheduler ──tick / kick──▶ Dispatcher::dispatch
//!                              ├─ AllocationEngine::run_pass
//!                              └─ Supervisor::spawn(DeliveryTask) × allocations
//!
//! DeliveryTask (one tokio task per batch):
//!   LOADING ─hold─▶ IN_FLIGHT ─hold─▶ DELIVERING ─hold─▶ (IN_FLIGHT …)
//!           ─▶ RETURNING ─hold─▶ IDLE ─▶ kick
//! ```
//!
//! Every hold is a `select!` between the delay and the supervisor's cancel
//! signal; a cancelled task stops at the hold it was in and applies the
//! configured [`InterruptPolicy`].
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`config`]     | `SimConfig`, `InterruptPolicy`                        |
//! | [`delivery`]   | `DeliveryTask`, `DeliveryOutcome`                     |
//! | [`supervisor`] | `Supervisor`: spawn, cancel and join delivery tasks   |
//! | [`dispatcher`] | `Dispatcher`: order intake, dispatch, read-side API   |
//! | [`scheduler`]  | `Scheduler`: periodic and proactive reconciliation    |
//! | [`builder`]    | `DispatcherBuilder`                                   |
//! | [`observer`]   | `DeliveryObserver`, `NoopObserver`, `TracingObserver` |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dd_route::NearestNeighborPlanner;
//! use dd_sim::{DispatcherBuilder, Scheduler, SimConfig};
//!
//! let dispatcher = Arc::new(
//!     DispatcherBuilder::new(SimConfig::default(), NearestNeighborPlanner).build()?,
//! );
//! let scheduler = Scheduler::new(Arc::clone(&dispatcher)).spawn();
//! dispatcher.submit_order(10, 20, 5.0, Priority::Low)?;
//! // …
//! dispatcher.shutdown().await;
//! scheduler.await;
//! ```

pub mod builder;
pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod error;
pub mod observer;
pub mod scheduler;
pub mod supervisor;

#[cfg(test)]
mod tests;

pub use builder::DispatcherBuilder;
pub use config::{InterruptPolicy, SimConfig};
pub use delivery::{DeliveryOutcome, DeliveryTask};
pub use dispatcher::Dispatcher;
pub use error::{SimError, SimResult};
pub use observer::{DeliveryObserver, NoopObserver, TracingObserver};
pub use scheduler::{Scheduler, SchedulerReport};
pub use supervisor::{Finished, Supervisor};
