//! Fluent builder for constructing a [`Dispatcher`].

use std::sync::Arc;

use tokio::sync::Notify;

use dd_alloc::AllocationEngine;
use dd_fleet::{DroneRegistry, DroneSpec, OrderStore, RouteStore};
use dd_route::RoutePlanner;

use crate::{DeliveryObserver, Dispatcher, NoopObserver, SimConfig, SimResult, Supervisor};

/// Fluent builder for [`Dispatcher<P>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: timing, interrupt policy, fleet
/// - `P: RoutePlanner`: e.g. [`dd_route::NearestNeighborPlanner`]
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                 |
/// |-----------------|-------------------------|
/// | `.fleet(v)`     | `config.fleet`          |
/// | `.observer(o)`  | [`NoopObserver`]        |
///
/// # Example
///
/// ```rust,ignore
/// let dispatcher = DispatcherBuilder::new(config, NearestNeighborPlanner)
///     .observer(Arc::new(TracingObserver))
///     .build()?;
/// ```
pub struct DispatcherBuilder<P: RoutePlanner> {
    config:   SimConfig,
    planner:  P,
    observer: Option<Arc<dyn DeliveryObserver>>,
}

impl<P: RoutePlanner> DispatcherBuilder<P> {
    pub fn new(config: SimConfig, planner: P) -> Self {
        Self { config, planner, observer: None }
    }

    /// Replace the configured fleet.
    pub fn fleet(mut self, fleet: Vec<DroneSpec>) -> Self {
        self.config.fleet = fleet;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn DeliveryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validate the configuration, register the fleet and return an idle
    /// dispatcher.  No task is started until the first dispatch.
    pub fn build(self) -> SimResult<Dispatcher<P>> {
        self.config.validate()?;

        let drones = DroneRegistry::new(self.config.fleet.iter().copied());
        let engine = AllocationEngine::new(
            self.planner,
            Arc::new(drones),
            Arc::new(OrderStore::new()),
            Arc::new(RouteStore::new()),
        );

        Ok(Dispatcher {
            engine,
            config:     self.config,
            observer:   self.observer.unwrap_or_else(|| Arc::new(NoopObserver)),
            supervisor: Supervisor::new(),
            kick:       Arc::new(Notify::new()),
        })
    }
}
