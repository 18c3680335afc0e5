//! Routing trait and the default nearest-neighbor implementation.
//!
//! # Pluggability
//!
//! `dd-alloc` and `dd-sim` call planning through the [`RoutePlanner`] trait,
//! so an application can swap in a smarter tour builder without touching the
//! allocation engine.  [`NearestNeighborPlanner`] reproduces the reference
//! heuristics exactly and is O(n²) in the number of stops.

use dd_core::{BASE, GridPoint, TimeScale};

use crate::Waypoint;

// ── Leg ───────────────────────────────────────────────────────────────────────

/// One straight hop of a flight.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Leg {
    pub from:        GridPoint,
    pub to:          GridPoint,
    pub distance_km: f64,
}

impl Leg {
    pub fn new(from: GridPoint, to: GridPoint) -> Self {
        Self { from, to, distance_km: from.distance_to(to) }
    }

    /// Simulated time units needed to fly this leg (rounded down).
    #[inline]
    pub fn travel_units(&self) -> u64 {
        TimeScale::travel_units(self.distance_km)
    }
}

/// Break a flown sequence into legs: `start → stop₀ → … → stopₙ → BASE`.
///
/// An empty sequence yields the single leg `start → BASE` (zero length when
/// the drone is already home).
pub fn legs<W: Waypoint>(sequence: &[W], start: GridPoint) -> Vec<Leg> {
    let mut out = Vec::with_capacity(sequence.len() + 1);
    let mut here = start;
    for stop in sequence {
        let next = stop.position();
        out.push(Leg::new(here, next));
        here = next;
    }
    out.push(Leg::new(here, BASE));
    out
}

// ── RoutePlanner trait ────────────────────────────────────────────────────────

/// Pluggable flight planner.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: the allocation engine and every
/// delivery task share one planner.
pub trait RoutePlanner: Send + Sync + 'static {
    /// Round-trip distance used for range feasibility.
    ///
    /// Returns `0.0` for an empty set regardless of `start`.
    fn route_distance<W: Waypoint>(&self, stops: &[W], start: GridPoint) -> f64;

    /// The order in which a batch is actually flown, starting from base.
    fn sequence<W: Waypoint + Clone>(&self, stops: &[W]) -> Vec<W>;
}

// ── NearestNeighborPlanner ────────────────────────────────────────────────────

/// Greedy planner matching the reference simulator.
#[derive(Copy, Clone, Debug, Default)]
pub struct NearestNeighborPlanner;

impl RoutePlanner for NearestNeighborPlanner {
    fn route_distance<W: Waypoint>(&self, stops: &[W], start: GridPoint) -> f64 {
        if stops.is_empty() {
            return 0.0;
        }

        // Single sort by distance from `start`; stable, so equidistant stops
        // keep their input order.
        let mut sorted: Vec<GridPoint> = stops.iter().map(Waypoint::position).collect();
        sorted.sort_by(|a, b| start.distance_to(*a).total_cmp(&start.distance_to(*b)));

        let mut total = 0.0;
        let mut previous = start;
        for point in sorted {
            total += previous.distance_to(point);
            previous = point;
        }
        total + previous.distance_to(BASE)
    }

    fn sequence<W: Waypoint + Clone>(&self, stops: &[W]) -> Vec<W> {
        let mut remaining: Vec<W> = stops.to_vec();
        let mut ordered = Vec::with_capacity(remaining.len());
        let mut current = BASE;

        while !remaining.is_empty() {
            // Strict `<` keeps the earliest candidate on ties.
            let mut best = 0;
            let mut best_distance = f64::MAX;
            for (i, stop) in remaining.iter().enumerate() {
                let d = current.distance_to(stop.position());
                if d < best_distance {
                    best_distance = d;
                    best = i;
                }
            }
            let next = remaining.remove(best);
            current = next.position();
            ordered.push(next);
        }
        ordered
    }
}
