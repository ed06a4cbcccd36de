//! Run configuration, loaded from YAML.
//!
//! ```yaml
//! model_type: SEI
//! latency_period_days: 14
//! rows: 200
//! cols: 300
//! ew_res: 30.0
//! ns_res: 30.0
//! date_start: 2020-01-01
//! date_end: 2022-12-31
//! random_seed: 42
//! reproductive_rate: 4.4
//! natural_kernel: { kind: cauchy, scale: 20.0 }
//! spread_schedule: { kind: in_season, start_month: 1, end_month: 9 }
//! use_mortality: true
//! mortality_rate: 0.25
//! mortality_time_lag: 1
//! mortality_frequency: { kind: end_of_year }
//! ```
//!
//! Every field other than the grid shape, resolution, dates and the natural
//! kernel has a default.

use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use pops_core::Date;
use pops_kernel::{KernelConfig, KernelType};
use pops_schedule::FrequencyRule;

use crate::{SimError, SimResult};

// ── Enums ─────────────────────────────────────────────────────────────────────

/// Host compartment structure.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum ModelType {
    /// Susceptible → Infected.
    #[default]
    SI,
    /// Susceptible → Exposed → Infected, with a latency period.
    SEI,
}

/// One step of the daily update.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Process {
    Disperse,
    Mortality,
    Movement,
    Overpopulation,
    Removal,
}

impl Process {
    pub const DEFAULT_ORDER: [Process; 5] = [
        Process::Disperse,
        Process::Mortality,
        Process::Movement,
        Process::Overpopulation,
        Process::Removal,
    ];
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Process::Disperse => "disperse",
            Process::Mortality => "mortality",
            Process::Movement => "movement",
            Process::Overpopulation => "overpopulation",
            Process::Removal => "removal",
        };
        f.write_str(s)
    }
}

// ── Defaults ──────────────────────────────────────────────────────────────────

fn yes() -> bool {
    true
}
fn one() -> f64 {
    1.0
}
fn one_u32() -> u32 {
    1
}
fn default_dispersal_percentage() -> f64 {
    0.99
}
fn new_year() -> FrequencyRule {
    FrequencyRule::Yearly { month: 1, day: 1 }
}
fn absolute_zero() -> f64 {
    -273.15
}
fn default_process_order() -> Vec<Process> {
    Process::DEFAULT_ORDER.to_vec()
}
fn end_of_year() -> FrequencyRule {
    FrequencyRule::EndOfYear
}

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model_type: ModelType,
    /// Spread steps between exposure and infection (SEI only).
    #[serde(default)]
    pub latency_period_days: u32,

    // ── Landscape ─────────────────────────────────────────────────────────
    pub rows:   usize,
    pub cols:   usize,
    pub ew_res: f64,
    pub ns_res: f64,

    // ── Time ──────────────────────────────────────────────────────────────
    pub date_start: Date,
    pub date_end:   Date,

    // ── Randomness ────────────────────────────────────────────────────────
    #[serde(default)]
    pub random_seed: u64,
    /// Use deterministic kernel branches (window / neighbor).
    #[serde(default)]
    pub deterministic: bool,
    #[serde(default = "yes")]
    pub generation_stochasticity: bool,
    #[serde(default = "yes")]
    pub establishment_stochasticity: bool,
    #[serde(default = "yes")]
    pub movement_stochasticity: bool,

    // ── Dispersal ─────────────────────────────────────────────────────────
    /// Mean dispersers per infected host per spread day.
    #[serde(default = "one")]
    pub reproductive_rate: f64,
    /// Probability a disperser landing on a susceptible host converts it,
    /// before density scaling.
    #[serde(default = "one")]
    pub establishment_probability: f64,
    /// Share of kernel mass covered by the deterministic window.
    #[serde(default = "default_dispersal_percentage")]
    pub dispersal_percentage: f64,
    pub natural_kernel: KernelConfig,
    #[serde(default)]
    pub anthropogenic_kernel: Option<KernelConfig>,
    #[serde(default = "one")]
    pub percent_natural_dispersal: f64,
    #[serde(default)]
    pub network_min_distance: f64,
    #[serde(default)]
    pub network_max_distance: f64,
    /// Pests leave their host when dispersing (host returns to susceptible).
    #[serde(default)]
    pub pests_leave_host: bool,
    /// Dispersers leaving the grid re-enter on the opposite edge.
    #[serde(default)]
    pub wrap_edges: bool,

    // ── Schedules ─────────────────────────────────────────────────────────
    #[serde(default)]
    pub spread_schedule: FrequencyRule,
    #[serde(default)]
    pub movement_schedule: FrequencyRule,
    #[serde(default = "end_of_year")]
    pub spread_rate_schedule: FrequencyRule,
    #[serde(default)]
    pub rate_num_steps: Option<usize>,

    // ── Mortality ─────────────────────────────────────────────────────────
    #[serde(default)]
    pub use_mortality: bool,
    #[serde(default)]
    pub mortality_rate: f64,
    /// Mortality steps before a new infection cohort can die.
    #[serde(default)]
    pub mortality_time_lag: u32,
    #[serde(default = "end_of_year")]
    pub mortality_frequency: FrequencyRule,
    /// Act only on every n-th scheduled mortality day.
    #[serde(default = "one_u32")]
    pub mortality_frequency_n: u32,

    // ── Climate removal ───────────────────────────────────────────────────
    /// Remove all infected hosts where the day's temperature grid is below
    /// `lethal_temperature`.
    #[serde(default)]
    pub use_lethal_temperature: bool,
    #[serde(default = "absolute_zero")]
    pub lethal_temperature: f64,
    #[serde(default = "new_year")]
    pub lethal_temperature_schedule: FrequencyRule,
    /// Keep only the surviving share of infected and exposed hosts.
    #[serde(default)]
    pub use_survival_rate: bool,
    #[serde(default = "new_year")]
    pub survival_rate_schedule: FrequencyRule,

    // ── Switches ──────────────────────────────────────────────────────────
    #[serde(default)]
    pub use_movements: bool,
    #[serde(default)]
    pub use_treatments: bool,
    /// On unless explicitly turned off.
    #[serde(default = "yes")]
    pub use_overpopulation_correction: bool,
    #[serde(default = "default_process_order")]
    pub process_order: Vec<Process>,
}

impl Config {
    /// A configuration with every optional field at its default and a
    /// unit-scale Cauchy natural kernel.
    pub fn new(rows: usize, cols: usize, date_start: Date, date_end: Date) -> Self {
        Self {
            model_type: ModelType::SI,
            latency_period_days: 0,
            rows,
            cols,
            ew_res: 1.0,
            ns_res: 1.0,
            date_start,
            date_end,
            random_seed: 0,
            deterministic: false,
            generation_stochasticity: true,
            establishment_stochasticity: true,
            movement_stochasticity: true,
            reproductive_rate: 1.0,
            establishment_probability: 1.0,
            dispersal_percentage: default_dispersal_percentage(),
            natural_kernel: KernelConfig::new(KernelType::Cauchy, 1.0),
            anthropogenic_kernel: None,
            percent_natural_dispersal: 1.0,
            network_min_distance: 0.0,
            network_max_distance: 0.0,
            pests_leave_host: false,
            wrap_edges: false,
            spread_schedule: FrequencyRule::Daily,
            movement_schedule: FrequencyRule::Daily,
            spread_rate_schedule: FrequencyRule::EndOfYear,
            rate_num_steps: None,
            use_mortality: false,
            mortality_rate: 0.0,
            mortality_time_lag: 0,
            mortality_frequency: FrequencyRule::EndOfYear,
            mortality_frequency_n: 1,
            use_lethal_temperature: false,
            lethal_temperature: absolute_zero(),
            lethal_temperature_schedule: new_year(),
            use_survival_rate: false,
            survival_rate_schedule: new_year(),
            use_movements: false,
            use_treatments: false,
            use_overpopulation_correction: true,
            process_order: default_process_order(),
        }
    }

    pub fn from_yaml_str(s: &str) -> SimResult<Self> {
        let cfg: Config = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_reader<R: Read>(reader: R) -> SimResult<Self> {
        let cfg: Config = serde_yaml::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_yaml_reader(std::io::BufReader::new(file))
    }

    pub fn to_yaml_string(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every field that can be checked without the input grids.
    pub fn validate(&self) -> SimResult<()> {
        let bad = |msg: String| Err(SimError::Config(msg));

        if self.rows == 0 || self.cols == 0 {
            return bad(format!("grid must be non-empty, got {}x{}", self.rows, self.cols));
        }
        for (name, res) in [("ew_res", self.ew_res), ("ns_res", self.ns_res)] {
            if !(res.is_finite() && res > 0.0) {
                return bad(format!("{name} must be positive, got {res}"));
            }
        }
        if self.model_type == ModelType::SEI && self.latency_period_days == 0 {
            return bad("SEI model needs latency_period_days > 0".into());
        }
        if !(self.reproductive_rate.is_finite() && self.reproductive_rate >= 0.0) {
            return bad(format!("reproductive_rate must be >= 0, got {}", self.reproductive_rate));
        }
        for (name, p) in [
            ("establishment_probability", self.establishment_probability),
            ("percent_natural_dispersal", self.percent_natural_dispersal),
            ("mortality_rate", self.mortality_rate),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return bad(format!("{name} must be in [0, 1], got {p}"));
            }
        }
        if !(self.dispersal_percentage > 0.0 && self.dispersal_percentage < 1.0) {
            return bad(format!(
                "dispersal_percentage must be in (0, 1), got {}",
                self.dispersal_percentage
            ));
        }
        if !(self.network_min_distance >= 0.0 && self.network_min_distance <= self.network_max_distance) {
            return bad(format!(
                "network distance range [{}, {}] is invalid",
                self.network_min_distance, self.network_max_distance
            ));
        }
        if self.use_mortality && !(self.mortality_rate > 0.0) {
            return bad("use_mortality needs mortality_rate > 0".into());
        }
        if self.mortality_frequency_n == 0 {
            return bad("mortality_frequency_n must be at least 1".into());
        }
        if !self.lethal_temperature.is_finite() {
            return bad(format!("lethal_temperature must be finite, got {}", self.lethal_temperature));
        }

        for rule in [
            &self.spread_schedule,
            &self.movement_schedule,
            &self.spread_rate_schedule,
            &self.mortality_frequency,
            &self.lethal_temperature_schedule,
            &self.survival_rate_schedule,
        ] {
            rule.validate()?;
        }

        self.natural_kernel.validate()?;
        if let Some(anthro) = &self.anthropogenic_kernel {
            anthro.validate()?;
        }

        let mut seen = HashSet::new();
        for p in &self.process_order {
            if !seen.insert(*p) {
                return bad(format!("process {p} listed twice in process_order"));
            }
        }
        Ok(())
    }

    /// Number of exposed cohorts (SEI) or `0` (SI).
    pub(crate) fn exposed_cohorts(&self) -> usize {
        match self.model_type {
            ModelType::SI => 0,
            ModelType::SEI => self.latency_period_days as usize + 1,
        }
    }

    /// Number of infection-age cohorts tracked for mortality.
    ///
    /// A cohort reaching the oldest slot dies entirely, so the tracker is
    /// long enough for `1 / mortality_rate` partial-mortality steps after
    /// the lag.
    pub(crate) fn mortality_cohorts(&self) -> usize {
        if !self.use_mortality {
            return 1;
        }
        let lag = self.mortality_time_lag as usize;
        let life = (1.0 / self.mortality_rate.max(f64::MIN_POSITIVE)).ceil();
        lag + (life.min(u16::MAX as f64) as usize).max(1)
    }
}
