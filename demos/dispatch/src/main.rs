//! dispatch: end-to-end run of the drone dispatch simulator.
//!
//! Registers the configured fleet, starts the reconciliation scheduler, then
//! submits a stream of random orders on a square grid around the base.  The
//! run ends when every accepted order is delivered (or the time cap is hit);
//! fleet statistics are printed as JSON.
//!
//! Configuration comes from `Dispatch.toml` (or the path given as the first
//! argument) with `DISPATCH_*` environment overrides.  Set `RUST_LOG=debug`
//! for per-pass and observer events.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dd_core::{OrderState, Priority};
use dd_output::{CsvObserver, CsvWriter};
use dd_route::NearestNeighborPlanner;
use dd_sim::{DeliveryObserver, DispatcherBuilder, Scheduler, SimConfig, TracingObserver};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    sim:  SimConfig,
    demo: DemoSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoSettings {
    orders:           usize,
    seed:             u64,
    /// Destinations are drawn from `[-grid_radius, grid_radius]²`.
    grid_radius:      i32,
    max_payload_kg:   f64,
    /// Time units between two submissions.
    submit_gap_units: u64,
    /// Give up waiting for deliveries after this many units.
    max_run_units:    u64,
    /// Write CSV output here when set.
    output_dir:       Option<PathBuf>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            orders:           30,
            seed:             42,
            grid_radius:      10,
            max_payload_kg:   12.0,
            submit_gap_units: 2,
            max_run_units:    2_000,
            output_dir:       None,
        }
    }
}

fn load_settings() -> Result<Settings> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "Dispatch".to_owned());
    let settings = config::Config::builder()
        .add_source(config::File::with_name(&path).required(false))
        .add_source(
            config::Environment::with_prefix("DISPATCH")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("cannot read configuration from {path}"))?;
    settings.try_deserialize().context("invalid configuration")
}

// ── Orders ────────────────────────────────────────────────────────────────────

fn random_priority(rng: &mut SmallRng) -> Priority {
    match rng.gen_range(0..3) {
        0 => Priority::Low,
        1 => Priority::Medium,
        _ => Priority::High,
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("cannot install tracing subscriber")?;

    let Settings { sim, demo } = load_settings()?;
    let scale = sim.time_scale();
    info!(
        drones  = sim.fleet.len(),
        orders  = demo.orders,
        seed    = demo.seed,
        unit_ms = sim.time_unit_ms,
        "dispatch: drone delivery simulator"
    );

    // 1. Observer: CSV export when an output directory is configured.
    let csv = match &demo.output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
            let writer = CsvWriter::new(dir).context("cannot open CSV output")?;
            Some(Arc::new(CsvObserver::new(writer)))
        }
        None => None,
    };
    let observer: Arc<dyn DeliveryObserver> = match &csv {
        Some(obs) => obs.clone() as Arc<dyn DeliveryObserver>,
        None => Arc::new(TracingObserver),
    };

    // 2. Dispatcher and scheduler.
    let dispatcher = Arc::new(
        DispatcherBuilder::new(sim, NearestNeighborPlanner)
            .observer(observer)
            .build()
            .context("cannot build dispatcher")?,
    );
    let scheduler = Scheduler::new(Arc::clone(&dispatcher)).spawn();

    // 3. Submit random orders.
    let wall = Instant::now();
    let mut rng = SmallRng::seed_from_u64(demo.seed);
    let r = demo.grid_radius.abs();
    for _ in 0..demo.orders {
        let x = rng.gen_range(-r..=r);
        let y = rng.gen_range(-r..=r);
        let kg = rng.gen_range(0.5..=demo.max_payload_kg.max(0.5));
        let priority = random_priority(&mut rng);
        dispatcher.submit_order(x, y, (kg * 10.0).round() / 10.0, priority)?;
        sleep(scale.duration(demo.submit_gap_units)).await;
    }

    // 4. Wait for the pool to drain.
    let poll = scale.duration(1);
    let settled = tokio::time::timeout(scale.duration(demo.max_run_units), async {
        loop {
            let open = dispatcher.list_orders().iter().any(|o| !o.state.is_terminal());
            if !open && dispatcher.supervisor().active() == 0 {
                break;
            }
            sleep(poll).await;
        }
    })
    .await;
    if settled.is_err() {
        warn!(max_run_units = demo.max_run_units, "time cap reached with orders still open");
    }

    // 5. Shut down and report.
    let finished = dispatcher.shutdown().await;
    let report = scheduler.await.context("scheduler task failed")?;
    info!(
        joined    = finished.len(),
        ticks     = report.ticks,
        proactive = report.proactive,
        elapsed   = ?wall.elapsed(),
        "run finished"
    );

    if let Some(obs) = &csv {
        obs.finish();
        if let Some(e) = obs.take_error() {
            warn!(error = %e, "CSV output incomplete");
        }
    }

    let refused = dispatcher
        .list_orders()
        .iter()
        .filter(|o| o.state == OrderState::Refused)
        .count();
    info!(refused, routes = dispatcher.list_routes().len(), "order summary");
    println!("{}", serde_json::to_string_pretty(&dispatcher.statistics())?);
    Ok(())
}
