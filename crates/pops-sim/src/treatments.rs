//! Management treatments.
//!
//! | Kind        | On `start`                                    | While active         | On `end`              |
//! |-------------|-----------------------------------------------|----------------------|-----------------------|
//! | `Simple`    | remove treated S, E, I                        | –                    | –                     |
//! | `Pesticide` | move treated S, E, I into `resistant`         | –                    | resistant → S         |
//! | `Mortality` | –                                             | per-cell mortality rate override | –        |
//!
//! The treatment map holds a per-cell efficacy in `[0, 1]`.  Susceptible
//! hosts are always treated by ratio, `floor(S × map)`.  Infected and
//! exposed hosts follow the [`TreatmentApplication`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use pops_core::{Cell, Date, Grid, GridAccess};

use crate::{HostPool, SimError, SimResult};

// ── TreatmentApplication ──────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TreatmentApplication {
    /// Treat `floor(count × map)` hosts.
    #[default]
    Ratio,
    /// Treat every host in cells where `map > 0`.
    AllInfectedInCell,
}

impl TreatmentApplication {
    fn treated(self, count: i32, efficacy: f64) -> i32 {
        match self {
            TreatmentApplication::Ratio => (count as f64 * efficacy).floor() as i32,
            TreatmentApplication::AllInfectedInCell => {
                if efficacy > 0.0 { count } else { 0 }
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TreatmentApplication::Ratio => "ratio",
            TreatmentApplication::AllInfectedInCell => "all_infected_in_cell",
        }
    }
}

impl fmt::Display for TreatmentApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreatmentApplication {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, SimError> {
        match s.trim() {
            "ratio" | "ratio_to_all" => Ok(TreatmentApplication::Ratio),
            "all_infected_in_cell" | "all infected" => Ok(TreatmentApplication::AllInfectedInCell),
            other => Err(SimError::Parse(format!("unknown treatment application {other:?}"))),
        }
    }
}

impl TryFrom<String> for TreatmentApplication {
    type Error = SimError;
    fn try_from(s: String) -> Result<Self, SimError> {
        s.parse()
    }
}

impl From<TreatmentApplication> for String {
    fn from(a: TreatmentApplication) -> String {
        a.as_str().to_owned()
    }
}

// ── Treatment ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentKind {
    Simple,
    Pesticide,
    Mortality,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Treatment {
    pub start:       Date,
    pub end:         Date,
    pub kind:        TreatmentKind,
    pub application: TreatmentApplication,
    pub map:         Grid<f64>,
}

impl Treatment {
    /// One-off removal on `date`.
    pub fn simple(date: Date, map: Grid<f64>, application: TreatmentApplication) -> Self {
        Self { start: date, end: date, kind: TreatmentKind::Simple, application, map }
    }

    /// Protection from `start` until `end`.
    pub fn pesticide(start: Date, end: Date, map: Grid<f64>, application: TreatmentApplication) -> Self {
        Self { start, end, kind: TreatmentKind::Pesticide, application, map }
    }

    /// Mortality rate override between `start` and `end` (inclusive).
    pub fn mortality(start: Date, end: Date, rates: Grid<f64>) -> Self {
        Self { start, end, kind: TreatmentKind::Mortality, application: TreatmentApplication::Ratio, map: rates }
    }

    pub fn is_active_on(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    fn efficacy(&self, cell: Cell) -> f64 {
        self.map[cell]
    }
}

/// Start or end of a pesticide treatment.
#[derive(Copy, Clone, Debug)]
pub enum PesticideEvent<'a> {
    Start(&'a Treatment),
    End(&'a Treatment),
}

// ── Treatments ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct Treatments {
    items: Vec<Treatment>,
}

impl Treatments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a treatment.  Efficacies must be finite and within `[0, 1]`,
    /// and the window must not be inverted.
    pub fn push(&mut self, t: Treatment) -> SimResult<&mut Self> {
        if t.end < t.start {
            return Err(SimError::Config(format!("treatment ends {} before it starts {}", t.end, t.start)));
        }
        if let Some(v) = t.map.iter().find(|v| !(v.is_finite() && (0.0..=1.0).contains(*v))) {
            return Err(SimError::Config(format!("treatment map value {v} outside [0, 1]")));
        }
        self.items.push(t);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Treatment> {
        self.items.iter()
    }

    /// Every map must match the host grid.
    pub(crate) fn check_shape(&self, rows: usize, cols: usize) -> SimResult<()> {
        for t in &self.items {
            if t.map.rows() != rows || t.map.cols() != cols {
                return Err(SimError::ShapeMismatch {
                    what: "treatment map",
                    rows,
                    cols,
                    got_rows: t.map.rows(),
                    got_cols: t.map.cols(),
                });
            }
        }
        Ok(())
    }

    /// Simple treatments applied on `date`.
    pub fn removal_on(&self, date: Date) -> impl Iterator<Item = &Treatment> + '_ {
        self.items.iter().filter(move |t| t.kind == TreatmentKind::Simple && t.start == date)
    }

    /// Pesticide treatments starting or ending on `date`, starts first.
    pub fn pesticide_events_on(&self, date: Date) -> Vec<PesticideEvent<'_>> {
        let pesticides = self.items.iter().filter(|t| t.kind == TreatmentKind::Pesticide);
        let starts = pesticides.clone().filter(|t| t.start == date).map(PesticideEvent::Start);
        let ends = pesticides.filter(|t| t.end == date).map(PesticideEvent::End);
        starts.chain(ends).collect()
    }

    /// Mortality rate set by the most recently added active mortality
    /// treatment covering `cell`, if any.
    pub fn mortality_override(&self, date: Date, cell: Cell) -> Option<f64> {
        self.items
            .iter()
            .rev()
            .filter(|t| t.kind == TreatmentKind::Mortality && t.is_active_on(date))
            .map(|t| t.efficacy(cell))
            .find(|&rate| rate > 0.0)
    }

    /// Apply every removal and pesticide event due on `date`.  Returns the
    /// number of hosts removed from the population.
    pub(crate) fn apply_on(&self, date: Date, hosts: &mut HostPool) -> u64 {
        let mut removed = 0;
        for t in self.removal_on(date) {
            removed += apply_removal(t, hosts);
        }
        for event in self.pesticide_events_on(date) {
            match event {
                PesticideEvent::Start(t) => protect(t, hosts),
                PesticideEvent::End(t) => release(t, hosts),
            }
        }
        removed
    }
}

fn apply_removal(t: &Treatment, hosts: &mut HostPool) -> u64 {
    let mut removed = 0u64;
    for cell in t.map.iter_cells() {
        let m = t.efficacy(cell);
        if m <= 0.0 {
            continue;
        }
        let s = TreatmentApplication::Ratio.treated(hosts.susceptible[cell], m);
        hosts.susceptible[cell] -= s;
        let e = t.application.treated(hosts.exposed_at(cell), m);
        let e = hosts.take_exposed(cell, e);
        let i = t.application.treated(hosts.infected[cell], m);
        let i: i32 = hosts.take_infected(cell, i).iter().sum();
        removed += (s + e + i) as u64;
    }
    removed
}

fn protect(t: &Treatment, hosts: &mut HostPool) {
    for cell in t.map.iter_cells() {
        let m = t.efficacy(cell);
        if m <= 0.0 {
            continue;
        }
        let s = TreatmentApplication::Ratio.treated(hosts.susceptible[cell], m);
        hosts.susceptible[cell] -= s;
        let e = t.application.treated(hosts.exposed_at(cell), m);
        let e = hosts.take_exposed(cell, e);
        let i = t.application.treated(hosts.infected[cell], m);
        let i: i32 = hosts.take_infected(cell, i).iter().sum();
        hosts.resistant[cell] += s + e + i;
    }
}

fn release(t: &Treatment, hosts: &mut HostPool) {
    for cell in t.map.iter_cells() {
        if t.efficacy(cell) > 0.0 {
            hosts.susceptible[cell] += hosts.resistant[cell];
            hosts.resistant[cell] = 0;
        }
    }
}
