//! Plain data row types written by output backends.

/// A drone entering a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRow {
    /// Milliseconds since the observer was created.
    pub elapsed_ms: u64,
    pub drone_id:   u32,
    /// Drone status name, or `INTERRUPTED` when a task was cancelled (those
    /// rows carry base coordinates).
    pub status:     &'static str,
    pub x:          i32,
    pub y:          i32,
}

/// One order handed over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryRow {
    pub elapsed_ms: u64,
    pub drone_id:   u32,
    pub order_id:   u64,
    pub x:          i32,
    pub y:          i32,
    pub payload_kg: f64,
}

/// A route at the moment its batch finished.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub elapsed_ms:        u64,
    pub route_id:          u64,
    pub drone_id:          u32,
    pub status:            &'static str,
    pub total_distance_km: f64,
    /// Order ids in flown sequence, `;`-separated.
    pub order_ids:         String,
}
