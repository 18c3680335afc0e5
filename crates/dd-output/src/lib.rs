//! `dd-output`: simulation output writers for the drone dispatch simulator.
//!
//! | Backend | Files created                                        |
//! |---------|------------------------------------------------------|
//! | CSV     | `drone_phases.csv`, `deliveries.csv`, `routes.csv`   |
//!
//! Backends implement [`OutputWriter`] and are driven by [`OutputObserver`],
//! which implements `dd_sim::DeliveryObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dd_output::{CsvObserver, CsvWriter};
//!
//! let observer = Arc::new(CsvObserver::new(CsvWriter::new(Path::new("./output"))?));
//! let dispatcher = DispatcherBuilder::new(config, NearestNeighborPlanner)
//!     .observer(observer.clone())
//!     .build()?;
//! // … run …
//! observer.finish();
//! observer.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{CsvObserver, OutputObserver};
pub use row::{DeliveryRow, PhaseRow, RouteRow};
pub use writer::OutputWriter;
