//! Fluent builder for constructing a [`Model`].

use std::sync::Arc;

use pops_core::{Grid, SimRng};
use pops_kernel::{build_kernel, KernelContext};
use pops_network::Network;
use pops_schedule::Scheduler;

use crate::model::Schedules;
use crate::{
    Config, HostPool, Model, QuarantineAreas, ScheduledMovement, SimError, SimResult, SpreadEngine, SpreadRate,
    Treatments,
};

/// Fluent builder for [`Model`].
///
/// # Required inputs
///
/// - [`Config`]: grid shape, dates, seed, kernels, schedules, …
/// - [`HostPool`]: initial susceptible, infected and carrying capacity
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                                |
/// |----------------------|----------------------------------------|
/// | `.network(n)`        | none (network kernel and movement off) |
/// | `.treatments(t)`     | no treatments                          |
/// | `.weather(grid)`     | coefficient 1 everywhere               |
/// | `.movements(v)`      | no scheduled movements                 |
/// | `.quarantine(q)`     | no quarantine areas                    |
/// | `.temperatures(v)`   | none (needed for lethal temperature)   |
/// | `.survival_rates(v)` | none (needed for survival rate)        |
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::load("landscape.yaml")?;
/// let hosts  = HostPool::new(susceptible, infected, capacity)?;
/// let mut model = ModelBuilder::new(config, hosts)
///     .weather(weather)
///     .treatments(treatments)
///     .build()?;
/// let output = model.run(&mut NoopObserver, SnapshotMode::FinalOnly)?;
/// ```
pub struct ModelBuilder {
    config:         Config,
    hosts:          HostPool,
    network:        Option<Network>,
    treatments:     Option<Treatments>,
    weather:        Option<Grid<f64>>,
    movements:      Option<Vec<ScheduledMovement>>,
    quarantine:     Option<QuarantineAreas>,
    temperatures:   Vec<Grid<f64>>,
    survival_rates: Vec<Grid<f64>>,
}

impl ModelBuilder {
    pub fn new(config: Config, hosts: HostPool) -> Self {
        Self {
            config,
            hosts,
            network:        None,
            treatments:     None,
            weather:        None,
            movements:      None,
            quarantine:     None,
            temperatures:   Vec::new(),
            survival_rates: Vec::new(),
        }
    }

    /// Transport network used by the network kernel and by host movement.
    pub fn network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    /// Only applied when `config.use_treatments` is set.
    pub fn treatments(mut self, treatments: Treatments) -> Self {
        self.treatments = Some(treatments);
        self
    }

    /// Per-cell multiplier on the reproductive rate.
    pub fn weather(mut self, weather: Grid<f64>) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Only applied when `config.use_movements` is set.
    pub fn movements(mut self, movements: Vec<ScheduledMovement>) -> Self {
        self.movements = Some(movements);
        self
    }

    pub fn quarantine(mut self, areas: QuarantineAreas) -> Self {
        self.quarantine = Some(areas);
        self
    }

    /// One temperature grid per day of `lethal_temperature_schedule`, in
    /// date order.
    pub fn temperatures(mut self, temperatures: Vec<Grid<f64>>) -> Self {
        self.temperatures = temperatures;
        self
    }

    /// One survival grid per day of `survival_rate_schedule`, in date order.
    pub fn survival_rates(mut self, survival_rates: Vec<Grid<f64>>) -> Self {
        self.survival_rates = survival_rates;
        self
    }

    /// Validate inputs, build schedules and the kernel, and return a
    /// ready-to-run [`Model`].
    pub fn build(self) -> SimResult<Model> {
        let config = self.config;
        let mut hosts = self.hosts;

        // ── Validate ──────────────────────────────────────────────────────
        config.validate()?;
        if config.date_end < config.date_start {
            return Err(SimError::Config(format!(
                "date_end {} is before date_start {}",
                config.date_end, config.date_start
            )));
        }
        if let Some(q) = &self.quarantine {
            if q.rows() != config.rows || q.cols() != config.cols {
                return Err(SimError::ShapeMismatch {
                    what:     "quarantine areas",
                    rows:     config.rows,
                    cols:     config.cols,
                    got_rows: q.rows(),
                    got_cols: q.cols(),
                });
            }
        }

        // ── Schedules ─────────────────────────────────────────────────────
        let scheduler = Scheduler::new(config.date_start, config.date_end);
        let schedules = Schedules {
            spread:             scheduler.build(&config.spread_schedule)?,
            mortality:          scheduler.build(&config.mortality_frequency)?,
            movement:           scheduler.build(&config.movement_schedule)?,
            spread_rate:        scheduler.build(&config.spread_rate_schedule)?,
            lethal_temperature: scheduler.build(&config.lethal_temperature_schedule)?,
            survival_rate:      scheduler.build(&config.survival_rate_schedule)?,
        };
        for (enabled, what, needed, got) in [
            (
                config.use_lethal_temperature,
                "temperature",
                schedules.lethal_temperature.count_active(),
                self.temperatures.len(),
            ),
            (
                config.use_survival_rate,
                "survival rate",
                schedules.survival_rate.count_active(),
                self.survival_rates.len(),
            ),
        ] {
            if enabled && got < needed {
                return Err(SimError::Config(format!(
                    "{needed} scheduled {what} days but only {got} {what} grids"
                )));
            }
        }

        // ── Kernel ────────────────────────────────────────────────────────
        let network = self.network.map(Arc::new);
        let ctx = KernelContext {
            dispersal_percentage: config.dispersal_percentage,
            deterministic: config.deterministic,
            network: network.clone(),
            network_min_distance: config.network_min_distance,
            network_max_distance: config.network_max_distance,
            ..KernelContext::new(config.rows, config.cols, config.ew_res, config.ns_res)
        };
        let kernel = build_kernel(
            &config.natural_kernel,
            config.anthropogenic_kernel.as_ref(),
            config.percent_natural_dispersal,
            &ctx,
        )?;

        // ── Engine ────────────────────────────────────────────────────────
        let seed = config.random_seed;
        let rate_steps = config.rate_num_steps.unwrap_or_else(|| schedules.spread_rate.count_active());
        let (ew_res, ns_res) = (config.ew_res, config.ns_res);

        let mut engine = SpreadEngine::new(config, kernel, &mut hosts)?
            .with_movements(self.movements.unwrap_or_default())
            .with_temperatures(self.temperatures)?
            .with_survival_rates(self.survival_rates)?;
        if let Some(weather) = self.weather {
            engine = engine.with_weather(weather)?;
        }
        if let Some(treatments) = self.treatments {
            engine = engine.with_treatments(treatments)?;
        }
        if let Some(network) = network {
            engine = engine.with_network(network);
        }

        let spread_rate = SpreadRate::new(&hosts.infected, ew_res, ns_res, rate_steps);

        Ok(Model {
            engine,
            hosts,
            rng: SimRng::new(seed),
            scheduler,
            schedules,
            spread_rate,
            quarantine: self.quarantine,
            day: 0,
            rate_steps_done: 0,
        })
    }
}
