//! The per-day spread update.
//!
//! # Daily processes (default order)
//!
//! ```text
//! ① Disperse        — generate dispersers from infected hosts, sample a
//!                     destination for each, establish on susceptible hosts
//! ② Mortality       — kill infected cohorts past the time lag
//! ③ Movement        — move hosts along the network and by dated records
//! ④ Overpopulation  — push hosts above carrying capacity into neighbours
//! ⑤ Removal         — lethal temperature, survival rate, treatments and
//!                     queued removal requests
//! ```
//!
//! Each process is gated by its schedule flag for the day and by the
//! corresponding `use_*` switch.  The order is `Config::process_order`.
//! Cells are always visited in row-major order, so a run is a pure function
//! of its inputs and seed.

use std::sync::Arc;

use tracing::{trace, warn};

use pops_core::{Cell, Date, Direction, Grid, GridAccess, SimRng};
use pops_kernel::{DispersalKernel, NaturalAnthropogenicKernel, Origin};
use pops_network::Network;

use crate::movement::{apply_scheduled, move_along_network};
use crate::{Config, HostPool, ModelType, Process, ScheduledMovement, SimError, SimResult, Treatments};

// ── Reports ───────────────────────────────────────────────────────────────────

/// Which schedules fired on a day.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct DayFlags {
    pub spread:             bool,
    pub mortality:          bool,
    pub movement:           bool,
    pub spread_rate:        bool,
    pub lethal_temperature: bool,
    pub survival_rate:      bool,
}

/// What happened on one simulated day.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    pub date:                 Date,
    pub day_index:            usize,
    pub flags:                DayFlags,
    pub dispersers_generated: u64,
    /// Dispersers that infected (or exposed) a host.
    pub established:          u64,
    /// Dispersers that reached susceptible hosts but failed the density test.
    pub unestablished:        u64,
    /// Dispersers that landed on a cell with no susceptible hosts.
    pub lost_dispersers:      u64,
    /// Destinations of dispersers that left the grid.
    pub outside_dispersers:   Vec<(i64, i64)>,
    pub deaths:               u64,
    pub moved:                u64,
    /// Hosts above carrying capacity that found no room in any neighbour.
    pub unplaced_excess:      u64,
    /// Hosts taken out by treatments and removal requests.
    pub removed:              u64,
    /// Infected hosts removed by lethal temperatures.
    pub frozen:               u64,
    /// Infected and exposed hosts that did not survive.
    pub not_surviving:        u64,
}

impl StepReport {
    pub fn new(date: Date, day_index: usize, flags: DayFlags) -> Self {
        Self {
            date,
            day_index,
            flags,
            dispersers_generated: 0,
            established: 0,
            unestablished: 0,
            lost_dispersers: 0,
            outside_dispersers: Vec::new(),
            deaths: 0,
            moved: 0,
            unplaced_excess: 0,
            removed: 0,
            frozen: 0,
            not_surviving: 0,
        }
    }
}

/// Caller-requested removal of hosts from one cell, applied in the next
/// removal process.  Amounts are clamped to what the cell holds.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct RemovalRequest {
    pub row:         usize,
    pub col:         usize,
    pub susceptible: u32,
    pub infected:    u32,
}

// ── SpreadEngine ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SpreadEngine {
    config:         Config,
    kernel:         NaturalAnthropogenicKernel,
    weather:        Option<Grid<f64>>,
    network:        Option<Arc<Network>>,
    movements:      Vec<ScheduledMovement>,
    treatments:     Treatments,
    removals:       Vec<RemovalRequest>,
    /// One grid per scheduled lethal-temperature day.
    temperatures:   Vec<Grid<f64>>,
    /// One grid per scheduled survival-rate day.
    survival_rates: Vec<Grid<f64>>,
    lethal_days:    usize,
    survival_days:  usize,
    /// Compass index at which the next overpopulated cell starts looking.
    overpop_cursor: usize,
    /// Scheduled mortality days seen so far.
    mortality_days: usize,
}

impl SpreadEngine {
    /// `hosts` must match the configured grid shape.  Cohort trackers are
    /// sized here from the model type and mortality settings.
    pub fn new(config: Config, kernel: NaturalAnthropogenicKernel, hosts: &mut HostPool) -> SimResult<Self> {
        if hosts.rows() != config.rows || hosts.cols() != config.cols {
            return Err(SimError::ShapeMismatch {
                what:     "host pool",
                rows:     config.rows,
                cols:     config.cols,
                got_rows: hosts.rows(),
                got_cols: hosts.cols(),
            });
        }
        hosts.configure_cohorts(config.exposed_cohorts(), config.mortality_cohorts());
        Ok(Self {
            config,
            kernel,
            weather: None,
            network: None,
            movements: Vec::new(),
            treatments: Treatments::new(),
            removals: Vec::new(),
            temperatures: Vec::new(),
            survival_rates: Vec::new(),
            lethal_days: 0,
            survival_days: 0,
            overpop_cursor: 0,
            mortality_days: 0,
        })
    }

    /// Per-cell multiplier on the reproductive rate.
    pub fn with_weather(mut self, weather: Grid<f64>) -> SimResult<Self> {
        self.check_shape("weather coefficients", weather.rows(), weather.cols())?;
        if let Some(v) = weather.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(SimError::Config(format!("weather coefficient {v} must be finite and >= 0")));
        }
        self.weather = Some(weather);
        Ok(self)
    }

    pub fn with_network(mut self, network: Arc<Network>) -> Self {
        self.network = Some(network);
        self
    }

    pub fn with_movements(mut self, movements: Vec<ScheduledMovement>) -> Self {
        self.movements = movements;
        self
    }

    pub fn with_treatments(mut self, treatments: Treatments) -> SimResult<Self> {
        treatments.check_shape(self.config.rows, self.config.cols)?;
        self.treatments = treatments;
        Ok(self)
    }

    /// Temperature grids consumed in order, one per lethal-temperature day.
    pub fn with_temperatures(mut self, temperatures: Vec<Grid<f64>>) -> SimResult<Self> {
        for t in &temperatures {
            self.check_shape("temperature grid", t.rows(), t.cols())?;
            if let Some(v) = t.iter().find(|v| !v.is_finite()) {
                return Err(SimError::Config(format!("temperature {v} is not finite")));
            }
        }
        self.temperatures = temperatures;
        Ok(self)
    }

    /// Survival grids consumed in order, one per survival-rate day.
    pub fn with_survival_rates(mut self, survival_rates: Vec<Grid<f64>>) -> SimResult<Self> {
        for g in &survival_rates {
            self.check_shape("survival rate grid", g.rows(), g.cols())?;
            if let Some(v) = g.iter().find(|v| !(0.0..=1.0).contains(*v)) {
                return Err(SimError::Config(format!("survival rate {v} must be in [0, 1]")));
            }
        }
        self.survival_rates = survival_rates;
        Ok(self)
    }

    fn check_shape(&self, what: &'static str, rows: usize, cols: usize) -> SimResult<()> {
        if rows != self.config.rows || cols != self.config.cols {
            return Err(SimError::ShapeMismatch {
                what,
                rows: self.config.rows,
                cols: self.config.cols,
                got_rows: rows,
                got_cols: cols,
            });
        }
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn treatments(&self) -> &Treatments {
        &self.treatments
    }

    /// Queue a removal for the next removal process.
    pub fn queue_removal(&mut self, request: RemovalRequest) {
        self.removals.push(request);
    }

    // ── Day ───────────────────────────────────────────────────────────────

    /// Run every process due on `date` in the configured order.
    pub fn step(
        &mut self,
        hosts:     &mut HostPool,
        rng:       &mut SimRng,
        date:      Date,
        day_index: usize,
        flags:     DayFlags,
    ) -> SimResult<StepReport> {
        let mut report = StepReport::new(date, day_index, flags);
        let order = self.config.process_order.clone();
        for process in order {
            match process {
                Process::Disperse if flags.spread => self.disperse(hosts, rng, &mut report),
                Process::Mortality if flags.mortality && self.config.use_mortality => {
                    self.mortality(hosts, date, &mut report);
                    hosts.check_invariants()?;
                }
                Process::Movement if self.config.use_movements => {
                    self.movement(hosts, rng, date, flags.movement, &mut report)
                }
                Process::Overpopulation if self.config.use_overpopulation_correction => {
                    self.overpopulation(hosts, &mut report)
                }
                Process::Removal => {
                    self.removal(hosts, date, flags, &mut report);
                    hosts.check_invariants()?;
                }
                _ => {}
            }
        }
        Ok(report)
    }

    // ── ① Disperse ────────────────────────────────────────────────────────

    fn disperse(&mut self, hosts: &mut HostPool, rng: &mut SimRng, report: &mut StepReport) {
        self.kernel.begin_day();
        let (rows, cols) = hosts.shape();
        let reproductive_rate = self.config.reproductive_rate;
        let generation_stochastic = self.config.generation_stochasticity;
        let establishment_stochastic = self.config.establishment_stochasticity;
        let threshold = 1.0 - self.config.establishment_probability;
        let wrap = self.config.wrap_edges;
        let sei = self.config.model_type == ModelType::SEI;

        // Generate from the start-of-day state so new infections wait a day.
        let mut generated: Grid<u64> = Grid::new(rows, cols, 0);
        for cell in hosts.infected.iter_cells() {
            let infected = hosts.infected[cell];
            if infected <= 0 {
                continue;
            }
            let weather = self.weather.as_ref().map_or(1.0, |w| w[cell]);
            let lambda = reproductive_rate * weather * infected as f64;
            generated[cell] = if generation_stochastic { rng.poisson(lambda) } else { lambda.round() as u64 };
        }

        if self.config.pests_leave_host {
            for cell in generated.iter_cells() {
                let leaving = generated[cell].min(hosts.infected[cell].max(0) as u64) as i32;
                if leaving > 0 {
                    let back: i32 = hosts.take_infected(cell, leaving).iter().sum();
                    hosts.susceptible[cell] += back;
                }
            }
        }

        for cell in generated.iter_cells() {
            let n = generated[cell];
            if n == 0 {
                continue;
            }
            report.dispersers_generated += n;
            let (row, col) = cell.signed();
            let origin = Origin::new(row, col).with_dispersers(n);
            for _ in 0..n {
                let (mut r, mut c) = self.kernel.sample(rng, origin);
                if wrap {
                    r = r.rem_euclid(rows as i64);
                    c = c.rem_euclid(cols as i64);
                }
                let Some(target) = Cell::from_signed(r, c).filter(|t| t.row < rows && t.col < cols) else {
                    trace!(from = %cell, row = r, col = c, "disperser left the grid");
                    report.outside_dispersers.push((r, c));
                    continue;
                };
                let susceptible = hosts.susceptible[target];
                if susceptible <= 0 {
                    report.lost_dispersers += 1;
                    continue;
                }
                let capacity = hosts.carrying_capacity[target];
                let mut density = if capacity > 0 { susceptible as f64 / capacity as f64 } else { 0.0 };
                if let Some(w) = &self.weather {
                    density *= w[target];
                }
                let test = if establishment_stochastic { rng.uniform() } else { threshold };
                if test < density {
                    hosts.susceptible[target] -= 1;
                    if let Some(newest) = hosts.exposed.last_mut().filter(|_| sei) {
                        newest[target] += 1;
                    } else {
                        hosts.add_new_infected(target, 1);
                    }
                    report.established += 1;
                } else {
                    report.unestablished += 1;
                }
            }
        }

        if sei {
            hosts.advance_exposed();
        }
    }

    // ── ② Mortality ───────────────────────────────────────────────────────

    fn mortality(&mut self, hosts: &mut HostPool, date: Date, report: &mut StepReport) {
        let action = self.mortality_days;
        self.mortality_days += 1;
        if action % self.config.mortality_frequency_n as usize != 0 {
            return;
        }
        let lag = self.config.mortality_time_lag as usize;
        let cohorts = hosts.mortality_cohorts.len();
        if cohorts > lag {
            let eligible = cohorts - lag;
            let use_overrides = self.config.use_treatments;
            for cell in hosts.infected.iter_cells() {
                let rate = use_overrides
                    .then(|| self.treatments.mortality_override(date, cell))
                    .flatten()
                    .unwrap_or(self.config.mortality_rate);
                let mut dead_here = 0;
                for (index, cohort) in hosts.mortality_cohorts.iter_mut().take(eligible).enumerate() {
                    let count = cohort[cell];
                    if count <= 0 {
                        continue;
                    }
                    let dead = if index == 0 { count } else { (rate * count as f64).floor() as i32 };
                    cohort[cell] -= dead;
                    dead_here += dead;
                }
                if dead_here > 0 {
                    let dead_here = dead_here.min(hosts.infected[cell]);
                    hosts.infected[cell] -= dead_here;
                    hosts.died[cell] += dead_here;
                    report.deaths += dead_here as u64;
                }
            }
        }
        hosts.rotate_mortality();
    }

    // ── ③ Movement ────────────────────────────────────────────────────────

    fn movement(
        &mut self,
        hosts:       &mut HostPool,
        rng:         &mut SimRng,
        date:        Date,
        network_day: bool,
        report:      &mut StepReport,
    ) {
        let stochastic = self.config.movement_stochasticity;
        if network_day {
            if let Some(network) = &self.network {
                report.moved += move_along_network(hosts, network, stochastic, rng);
            }
        }
        report.moved += apply_scheduled(hosts, &self.movements, date, stochastic, rng);
    }

    // ── ④ Overpopulation ──────────────────────────────────────────────────

    fn overpopulation(&mut self, hosts: &mut HostPool, report: &mut StepReport) {
        let cells: Vec<Cell> = hosts.susceptible.iter_cells().collect();
        for cell in cells {
            let capacity = hosts.carrying_capacity[cell];
            let total = hosts.total_hosts(cell);
            if total <= capacity {
                continue;
            }
            let mut excess = total - capacity;
            let start = self.overpop_cursor;
            self.overpop_cursor = (self.overpop_cursor + 1) % Direction::CLOCKWISE.len();

            for k in 0..Direction::CLOCKWISE.len() {
                if excess == 0 {
                    break;
                }
                let dir = Direction::CLOCKWISE[(start + k) % Direction::CLOCKWISE.len()];
                let Some((dr, dc)) = dir.offset() else { continue };
                let (r, c) = cell.signed();
                if !hosts.susceptible.contains(r + dr, c + dc) {
                    continue;
                }
                let neighbour = Cell::new((r + dr) as usize, (c + dc) as usize);
                let spare = hosts.carrying_capacity[neighbour] - hosts.total_hosts(neighbour);
                if spare <= 0 {
                    continue;
                }
                let s = hosts.susceptible[cell].max(0);
                let i = hosts.infected[cell].max(0);
                if s + i == 0 {
                    break;
                }
                let amount = excess.min(spare).min(s + i);
                let infected = ((amount as f64 * i as f64 / (s + i) as f64).round() as i32)
                    .min(i)
                    .max(amount - s);
                let susceptible = amount - infected;

                hosts.susceptible[cell] -= susceptible;
                hosts.susceptible[neighbour] += susceptible;
                let by_cohort = hosts.take_infected(cell, infected);
                hosts.put_infected(neighbour, &by_cohort);
                report.moved += amount as u64;
                excess -= amount;
            }

            if excess > 0 {
                warn!(%cell, excess, "no room for hosts above carrying capacity; left in place");
                report.unplaced_excess += excess as u64;
            }
        }
    }

    // ── ⑤ Removal ─────────────────────────────────────────────────────────

    fn removal(&mut self, hosts: &mut HostPool, date: Date, flags: DayFlags, report: &mut StepReport) {
        if flags.lethal_temperature && self.config.use_lethal_temperature {
            let step = self.lethal_days;
            self.lethal_days += 1;
            let lethal = self.config.lethal_temperature;
            if let Some(temperature) = self.temperatures.get(step) {
                for cell in temperature.iter_cells() {
                    if temperature[cell] < lethal {
                        let n = hosts.infected[cell];
                        let gone: i32 = hosts.take_infected(cell, n).iter().sum();
                        report.frozen += gone as u64;
                    }
                }
            }
        }
        if flags.survival_rate && self.config.use_survival_rate {
            let step = self.survival_days;
            self.survival_days += 1;
            if let Some(survival) = self.survival_rates.get(step) {
                for cell in survival.iter_cells() {
                    let rate = survival[cell];
                    if rate >= 1.0 {
                        continue;
                    }
                    let infected = hosts.infected[cell];
                    let dead = infected - (infected as f64 * rate).round() as i32;
                    let gone: i32 = hosts.take_infected(cell, dead).iter().sum();
                    let exposed = hosts.exposed_at(cell);
                    let dead = exposed - (exposed as f64 * rate).round() as i32;
                    let gone_exposed = hosts.take_exposed(cell, dead);
                    report.not_surviving += (gone + gone_exposed) as u64;
                }
            }
        }
        if self.config.use_treatments {
            report.removed += self.treatments.apply_on(date, hosts);
        }
        for req in self.removals.drain(..) {
            let cell = Cell::new(req.row, req.col);
            if req.row >= hosts.rows() || req.col >= hosts.cols() {
                warn!(%cell, "removal request outside the grid ignored");
                continue;
            }
            let s = (req.susceptible.min(i32::MAX as u32) as i32).min(hosts.susceptible[cell]).max(0);
            hosts.susceptible[cell] -= s;
            let i: i32 = hosts.take_infected(cell, req.infected.min(i32::MAX as u32) as i32).iter().sum();
            report.removed += (s + i) as u64;
        }
    }
}
