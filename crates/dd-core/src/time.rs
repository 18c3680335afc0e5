//! Simulated time model.
//!
//! # Design
//!
//! Every delay in the simulator is expressed in abstract **time units**.  The
//! mapping to wall-clock time is held in `TimeScale`:
//!
//!   wall_duration = units * unit_ms
//!
//! The reference system uses one unit per second.  Tests shrink the unit (or
//! pause the tokio clock) so whole delivery cycles finish instantly.
//!
//! Travel legs round distance *down* to whole units, so a 0.9 km hop takes
//! zero time while a 2.99 km hop takes two units.

use std::time::Duration;

/// Converts time units into wall-clock durations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeScale {
    /// Wall milliseconds per simulated unit.  Default: 1000.
    pub unit_ms: u64,
}

impl TimeScale {
    pub const fn new(unit_ms: u64) -> Self {
        Self { unit_ms }
    }

    /// Wall duration of `units` simulated units.
    #[inline]
    pub fn duration(self, units: u64) -> Duration {
        Duration::from_millis(units.saturating_mul(self.unit_ms))
    }

    /// Whole units needed to fly `distance_km` (rounded down).
    #[inline]
    pub fn travel_units(distance_km: f64) -> u64 {
        if distance_km.is_finite() && distance_km > 0.0 {
            distance_km.floor() as u64
        } else {
            0
        }
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self { unit_ms: 1_000 }
    }
}
