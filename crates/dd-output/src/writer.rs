//! The `OutputWriter` trait implemented by backend writers.

use crate::{DeliveryRow, OutputResult, PhaseRow, RouteRow};

/// Trait implemented by output backends.
///
/// Errors are surfaced to the observer, which stores the first one for
/// [`OutputObserver::take_error`][crate::OutputObserver::take_error].
pub trait OutputWriter: Send {
    fn write_phase(&mut self, row: &PhaseRow) -> OutputResult<()>;

    fn write_delivery(&mut self, row: &DeliveryRow) -> OutputResult<()>;

    fn write_route(&mut self, row: &RouteRow) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
