//! `OutputObserver<W>`: bridges `DeliveryObserver` to an `OutputWriter`.

use parking_lot::Mutex;
use tokio::time::Instant;

use dd_core::{DroneId, DroneStatus, GridPoint, RouteId};
use dd_fleet::{Order, Route};
use dd_sim::DeliveryObserver;

use crate::row::{DeliveryRow, PhaseRow, RouteRow};
use crate::writer::OutputWriter;
use crate::{CsvWriter, OutputError, OutputResult};

/// The usual instantiation.
pub type CsvObserver = OutputObserver<CsvWriter>;

struct Inner<W> {
    writer:     W,
    last_error: Option<OutputError>,
}

/// A [`DeliveryObserver`] that writes phases, deliveries and finished routes
/// to any [`OutputWriter`].
///
/// Hooks arrive from many delivery tasks at once, so the writer sits behind
/// a mutex.  Errors are stored because hooks have no return value; check
/// with [`take_error`][Self::take_error] after the run.
///
/// Timestamps come from the tokio clock, so a paused test clock gives
/// reproducible files.
pub struct OutputObserver<W: OutputWriter> {
    started: Instant,
    inner:   Mutex<Inner<W>>,
}

impl<W: OutputWriter> OutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            started: Instant::now(),
            inner:   Mutex::new(Inner { writer, last_error: None }),
        }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&self) -> Option<OutputError> {
        self.inner.lock().last_error.take()
    }

    /// Flush the writer.  Any error is stored like a write error.
    pub fn finish(&self) {
        self.write(|w| w.finish());
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.inner.into_inner().writer
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn write(&self, f: impl FnOnce(&mut W) -> OutputResult<()>) {
        let mut inner = self.inner.lock();
        if let Err(e) = f(&mut inner.writer) {
            // Keep only the first error.
            if inner.last_error.is_none() {
                inner.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> DeliveryObserver for OutputObserver<W> {
    fn on_phase(&self, drone: DroneId, status: DroneStatus, position: GridPoint) {
        let row = PhaseRow {
            elapsed_ms: self.elapsed_ms(),
            drone_id:   drone.0,
            status:     status.as_str(),
            x:          position.x,
            y:          position.y,
        };
        self.write(|w| w.write_phase(&row));
    }

    fn on_delivered(&self, drone: DroneId, order: &Order) {
        let row = DeliveryRow {
            elapsed_ms: self.elapsed_ms(),
            drone_id:   drone.0,
            order_id:   order.id.0,
            x:          order.destination.x,
            y:          order.destination.y,
            payload_kg: order.payload_kg,
        };
        self.write(|w| w.write_delivery(&row));
    }

    fn on_batch_complete(&self, _drone: DroneId, route: &Route) {
        let row = RouteRow {
            elapsed_ms:        self.elapsed_ms(),
            route_id:          route.id.0,
            drone_id:          route.drone.id.0,
            status:            route.status.as_str(),
            total_distance_km: route.total_distance_km,
            order_ids:         route
                .orders
                .iter()
                .map(|o| o.id.0.to_string())
                .collect::<Vec<_>>()
                .join(";"),
        };
        self.write(|w| w.write_route(&row));
    }

    fn on_interrupted(&self, drone: DroneId, _route: RouteId, at: GridPoint, _undelivered: &[Order]) {
        let row = PhaseRow {
            elapsed_ms: self.elapsed_ms(),
            drone_id:   drone.0,
            status:     "INTERRUPTED",
            x:          at.x,
            y:          at.y,
        };
        self.write(|w| w.write_phase(&row));
    }
}
