//! landscape — synthetic forest run for the pops spread engine.
//!
//! Builds a 60×80 host landscape with a gradient of host density, a single
//! east–west road used for anthropogenic dispersal and host movement, and a
//! quarantine zone around the introduction point.  Runs one model with a
//! progress observer, then a small ensemble for the average spread rate.
//!
//! ```text
//! cargo run -p landscape                 # bundled landscape.yaml
//! cargo run -p landscape -- my.yaml      # custom configuration
//! RUST_LOG=debug cargo run -p landscape  # per-day step reports
//! ```

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pops_core::{Cell, Date, Grid, GridAccess};
use pops_network::{Network, NetworkBuilder};
use pops_sim::{
    average_spread_rate, run_ensemble_with, Config, HostPool, ModelBuilder, ModelObserver, QuarantineAreas,
    QuarantineReport, SnapshotMode, StepReport,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const BUNDLED_CONFIG: &str = include_str!("../landscape.yaml");
const ROAD_ROW:       usize = 30;
const ROAD_SPACING:   usize = 8;
const ENSEMBLE_RUNS:  usize = 8;
const THREADS:        usize = 4;

// ── Landscape ─────────────────────────────────────────────────────────────────

/// Capacity rises from 20 in the west to 100 in the east; a fifth of it is
/// susceptible host, the rest empty habitat.  Ten hosts are infected at the
/// introduction point.
fn build_hosts(rows: usize, cols: usize) -> Result<HostPool> {
    let capacity = Grid::from_vec(
        rows,
        cols,
        (0..rows * cols).map(|i| 20 + (80 * (i % cols) / cols.max(1)) as i32).collect(),
    )?;
    let susceptible = capacity.map(|&k| k / 5);
    let infected = Grid::new(rows, cols, 0);
    let mut hosts = HostPool::new(susceptible, infected, capacity)?;
    hosts.seed_infection(introduction(rows, cols), 10);
    Ok(hosts)
}

fn introduction(rows: usize, cols: usize) -> Cell {
    Cell::new(rows / 2, cols / 4)
}

/// Two-way road links every `ROAD_SPACING` cells along `ROAD_ROW`.
fn build_road(config: &Config) -> Result<Network> {
    let mut b = NetworkBuilder::new(config.ew_res, config.ns_res);
    let row = ROAD_ROW.min(config.rows - 1);
    let stops: Vec<usize> = (0..config.cols).step_by(ROAD_SPACING).collect();
    for pair in stops.windows(2) {
        b.add_two_way(Cell::new(row, pair[0]), Cell::new(row, pair[1]), 0.02);
    }
    Ok(b.build()?)
}

/// Area 1 is a 21×21 block centred on the introduction point.
fn build_quarantine(config: &Config) -> QuarantineAreas {
    let centre = introduction(config.rows, config.cols);
    let mut areas = Grid::new(config.rows, config.cols, 0);
    for cell in areas.iter_cells() {
        if cell.row.abs_diff(centre.row) <= 10 && cell.col.abs_diff(centre.col) <= 10 {
            areas[cell] = 1;
        }
    }
    QuarantineAreas::new(areas, config.ew_res, config.ns_res)
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Progress {
    spread_days:    usize,
    new_infections: u64,
    deaths:         u64,
    moved:          u64,
    left_grid:      usize,
    last_month:     Option<u32>,
}

impl ModelObserver for Progress {
    fn on_day_end(&mut self, report: &StepReport) {
        self.spread_days += report.flags.spread as usize;
        self.new_infections += report.established;
        self.deaths += report.deaths;
        self.moved += report.moved;
        self.left_grid += report.outside_dispersers.len();

        let month = report.date.month();
        if self.last_month != Some(month) && report.date.day() == 1 {
            info!(date = %report.date, infections = self.new_infections, deaths = self.deaths, "progress");
        }
        self.last_month = Some(month);
    }

    fn on_run_end(&mut self, last_date: Option<Date>, hosts: &HostPool) {
        info!(
            last = ?last_date.map(|d| d.to_string()),
            infected = hosts.total_infected(),
            died = hosts.total_died(),
            "model finished"
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Configuration.
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {path}"))?,
        None => Config::from_yaml_str(BUNDLED_CONFIG).context("parsing bundled landscape.yaml")?,
    };
    info!(rows = config.rows, cols = config.cols, start = %config.date_start, end = %config.date_end, "configuration loaded");

    // 2. Inputs.
    let hosts = build_hosts(config.rows, config.cols)?;
    let road = build_road(&config)?;
    info!(nodes = road.node_count(), edges = road.edge_count(), "road network built");

    // 3. One run with progress reporting.
    let mut model = ModelBuilder::new(config.clone(), hosts.clone())
        .network(road.clone())
        .quarantine(build_quarantine(&config))
        .build()?;
    let mut progress = Progress::default();
    let t0 = Instant::now();
    let output = model.run(&mut progress, SnapshotMode::FinalOnly)?;
    let elapsed = t0.elapsed();

    println!();
    println!("Single run: {} days in {:.3} s", output.days_run, elapsed.as_secs_f64());
    println!("  spread days      : {}", progress.spread_days);
    println!("  new infections   : {}", progress.new_infections);
    println!("  deaths           : {}", progress.deaths);
    println!("  hosts moved      : {}", progress.moved);
    println!("  dispersers lost  : {}", progress.left_grid);
    println!("  infected at end  : {}", output.final_hosts.total_infected());

    match model.quarantine_report() {
        Some(QuarantineReport::Escaped) => println!("  quarantine       : escaped"),
        Some(QuarantineReport::Contained(areas)) => {
            for a in areas {
                println!(
                    "  quarantine       : area {} contained, {:.0} m from the {} edge",
                    a.area_id, a.distance, a.direction
                );
            }
        }
        None => {}
    }

    // 4. Ensemble for the average spread rate.
    let t0 = Instant::now();
    let runs = run_ensemble_with(config.random_seed, ENSEMBLE_RUNS, THREADS, |seed| {
        let config = Config { random_seed: seed, ..config.clone() };
        ModelBuilder::new(config, hosts.clone()).network(road.clone()).build()
    })?;
    let rates: Vec<_> = runs.into_iter().map(|r| r.spread_rate).collect();

    println!();
    println!("Ensemble: {ENSEMBLE_RUNS} runs in {:.3} s", t0.elapsed().as_secs_f64());
    println!("{:<6} {:>10} {:>10} {:>10} {:>10}", "Step", "North", "South", "East", "West");
    println!("{}", "-".repeat(50));
    let steps = rates.first().map_or(0, |r| r.num_steps());
    for step in 0..steps {
        let r = average_spread_rate(&rates, step);
        println!("{:<6} {:>10.1} {:>10.1} {:>10.1} {:>10.1}", step, r.north, r.south, r.east, r.west);
    }

    Ok(())
}
