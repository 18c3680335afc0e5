//! Simulator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use dd_core::{DdError, DdResult, TimeScale};
use dd_fleet::DroneSpec;

/// What a delivery task does when it is cancelled mid-flight.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterruptPolicy {
    /// Requeue undelivered orders, abort the route and return the drone to
    /// `Idle` at base.
    #[default]
    Compensate,
    /// Log and leave every entity exactly as last mutated.
    Abandon,
}

/// All knobs of a simulation run.
///
/// Every field has a default, so a partial TOML table deserialises.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Reconciliation period in time units.  Default: 10.
    pub tick_period_units: u64,

    /// Wall milliseconds per time unit.  Default: 1000.
    pub time_unit_ms: u64,

    /// Hold while loading a batch.  Default: 1 unit.
    pub loading_units: u64,

    /// Hold at each destination.  Default: 1 unit.
    pub delivering_units: u64,

    pub interrupt_policy: InterruptPolicy,

    /// Run one extra pass as soon as a drone comes back.  Default: true.
    pub reconcile_after_delivery: bool,

    /// Drones are registered in this order with ids from 1.
    pub fleet: Vec<DroneSpec>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_period_units:        10,
            time_unit_ms:             1_000,
            loading_units:            1,
            delivering_units:         1,
            interrupt_policy:         InterruptPolicy::default(),
            reconcile_after_delivery: true,
            fleet: vec![
                DroneSpec::new(10.0, 20.0),
                DroneSpec::new(15.0, 25.0),
                DroneSpec::new(8.0, 18.0),
            ],
        }
    }
}

impl SimConfig {
    #[inline]
    pub fn time_scale(&self) -> TimeScale {
        TimeScale::new(self.time_unit_ms)
    }

    #[inline]
    pub fn tick_period(&self) -> Duration {
        self.time_scale().duration(self.tick_period_units)
    }

    /// Reject values the runtime cannot work with.
    ///
    /// # Errors
    ///
    /// `DdError::Config` naming the first offending field.
    pub fn validate(&self) -> DdResult<()> {
        if self.tick_period_units == 0 {
            return Err(DdError::Config("tick_period_units must be at least 1".into()));
        }
        if self.time_unit_ms == 0 {
            return Err(DdError::Config("time_unit_ms must be at least 1".into()));
        }
        for (i, spec) in self.fleet.iter().enumerate() {
            let ok = |v: f64| v.is_finite() && v > 0.0;
            if !ok(spec.max_payload_kg) || !ok(spec.max_range_km) {
                return Err(DdError::Config(format!(
                    "fleet[{i}]: capacity and range must be positive, got {} kg / {} km",
                    spec.max_payload_kg, spec.max_range_km
                )));
            }
        }
        Ok(())
    }
}
