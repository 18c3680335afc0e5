//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `drone_phases.csv`
//! - `deliveries.csv`
//! - `routes.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{DeliveryRow, OutputResult, PhaseRow, RouteRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    phases:     Writer<File>,
    deliveries: Writer<File>,
    routes:     Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut phases = Writer::from_path(dir.join("drone_phases.csv"))?;
        phases.write_record(["elapsed_ms", "drone_id", "status", "x", "y"])?;

        let mut deliveries = Writer::from_path(dir.join("deliveries.csv"))?;
        deliveries.write_record(["elapsed_ms", "drone_id", "order_id", "x", "y", "payload_kg"])?;

        let mut routes = Writer::from_path(dir.join("routes.csv"))?;
        routes.write_record([
            "elapsed_ms",
            "route_id",
            "drone_id",
            "status",
            "total_distance_km",
            "order_ids",
        ])?;

        Ok(Self { phases, deliveries, routes, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_phase(&mut self, row: &PhaseRow) -> OutputResult<()> {
        self.phases.write_record(&[
            row.elapsed_ms.to_string(),
            row.drone_id.to_string(),
            row.status.to_owned(),
            row.x.to_string(),
            row.y.to_string(),
        ])?;
        Ok(())
    }

    fn write_delivery(&mut self, row: &DeliveryRow) -> OutputResult<()> {
        self.deliveries.write_record(&[
            row.elapsed_ms.to_string(),
            row.drone_id.to_string(),
            row.order_id.to_string(),
            row.x.to_string(),
            row.y.to_string(),
            row.payload_kg.to_string(),
        ])?;
        Ok(())
    }

    fn write_route(&mut self, row: &RouteRow) -> OutputResult<()> {
        self.routes.write_record(&[
            row.elapsed_ms.to_string(),
            row.route_id.to_string(),
            row.drone_id.to_string(),
            row.status.to_owned(),
            format!("{:.3}", row.total_distance_km),
            row.order_ids.clone(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.phases.flush()?;
        self.deliveries.flush()?;
        self.routes.flush()?;
        Ok(())
    }
}
