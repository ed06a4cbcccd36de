//! Per-cell host compartments.
//!
//! # Cohorts
//!
//! Exposed hosts (SEI) and infected hosts are both tracked in age cohorts,
//! stored oldest first:
//!
//! ```text
//! exposed[0]              → becomes infected at the end of the next spread day
//! exposed[len - 1]        ← newly exposed hosts
//! mortality_cohorts[0]    → dies entirely on the next mortality step
//! mortality_cohorts[len - 1] ← newly infected hosts
//! ```
//!
//! At every cell the mortality cohorts sum to `infected`, and the exposed
//! cohorts sum to the exposed total.  Any operation that takes infected or
//! exposed hosts away also takes them from the cohorts, via
//! [`take_from_cohorts`].

use pops_core::{Cell, Grid, GridAccess};

use crate::{SimError, SimResult};

#[derive(Clone, Debug, PartialEq)]
pub struct HostPool {
    pub susceptible:       Grid<i32>,
    pub infected:          Grid<i32>,
    /// Exposed cohorts, oldest first.  Empty for SI models.
    pub exposed:           Vec<Grid<i32>>,
    /// Hosts protected by an active pesticide treatment.
    pub resistant:         Grid<i32>,
    /// Infected cohorts by infection age, oldest first.
    pub mortality_cohorts: Vec<Grid<i32>>,
    /// Cumulative deaths.
    pub died:              Grid<i32>,
    pub carrying_capacity: Grid<i32>,
}

fn check_shape(what: &'static str, rows: usize, cols: usize, g: &Grid<i32>) -> SimResult<()> {
    if g.rows() != rows || g.cols() != cols {
        return Err(SimError::ShapeMismatch { what, rows, cols, got_rows: g.rows(), got_cols: g.cols() });
    }
    Ok(())
}

impl HostPool {
    /// Build a pool from initial susceptible and infected counts.
    ///
    /// Counts must be non-negative and `S + I` must not exceed the carrying
    /// capacity anywhere.  Initial infections are placed in the newest
    /// mortality cohort once cohorts are configured.
    pub fn new(
        susceptible:       Grid<i32>,
        infected:          Grid<i32>,
        carrying_capacity: Grid<i32>,
    ) -> SimResult<Self> {
        let (rows, cols) = (susceptible.rows(), susceptible.cols());
        check_shape("infected", rows, cols, &infected)?;
        check_shape("carrying_capacity", rows, cols, &carrying_capacity)?;

        for cell in susceptible.iter_cells() {
            let (s, i, k) = (susceptible[cell], infected[cell], carrying_capacity[cell]);
            if s < 0 || i < 0 || k < 0 {
                return Err(SimError::Config(format!("negative initial host count at {cell}")));
            }
            if s as i64 + i as i64 > k as i64 {
                return Err(SimError::Config(format!(
                    "S + I = {} exceeds carrying capacity {k} at {cell}",
                    s + i
                )));
            }
        }

        Ok(Self {
            mortality_cohorts: vec![infected.clone()],
            exposed: Vec::new(),
            resistant: Grid::new(rows, cols, 0),
            died: Grid::new(rows, cols, 0),
            susceptible,
            infected,
            carrying_capacity,
        })
    }

    /// Pool where every cell holds `capacity` hosts, all susceptible.
    pub fn uniform(rows: usize, cols: usize, capacity: i32) -> Self {
        let s = Grid::new(rows, cols, capacity);
        Self {
            infected: Grid::new(rows, cols, 0),
            exposed: Vec::new(),
            resistant: Grid::new(rows, cols, 0),
            mortality_cohorts: vec![Grid::new(rows, cols, 0)],
            died: Grid::new(rows, cols, 0),
            carrying_capacity: s.clone(),
            susceptible: s,
        }
    }

    /// Infect `n` susceptible hosts at `cell` (clamped to what is there).
    pub fn seed_infection(&mut self, cell: Cell, n: i32) {
        let n = n.min(self.susceptible[cell]).max(0);
        self.susceptible[cell] -= n;
        self.infected[cell] += n;
        if let Some(newest) = self.mortality_cohorts.last_mut() {
            newest[cell] += n;
        }
    }

    /// Resize cohort trackers.  Existing infections go to the newest
    /// mortality cohort; exposed hosts are discarded back to susceptible.
    pub(crate) fn configure_cohorts(&mut self, exposed: usize, mortality: usize) {
        let (rows, cols) = self.shape();
        for e in self.exposed.drain(..) {
            for (s, x) in self.susceptible.as_mut_slice().iter_mut().zip(e.as_slice()) {
                *s += *x;
            }
        }
        self.exposed = vec![Grid::new(rows, cols, 0); exposed];
        let mut cohorts = vec![Grid::new(rows, cols, 0); mortality.max(1)];
        if let Some(newest) = cohorts.last_mut() {
            newest.as_mut_slice().copy_from_slice(self.infected.as_slice());
        }
        self.mortality_cohorts = cohorts;
    }

    pub fn rows(&self) -> usize {
        self.susceptible.rows()
    }

    pub fn cols(&self) -> usize {
        self.susceptible.cols()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    pub fn exposed_at(&self, cell: Cell) -> i32 {
        self.exposed.iter().map(|g| g[cell]).sum()
    }

    /// `S + E + I + R` at `cell`.
    pub fn total_hosts(&self, cell: Cell) -> i32 {
        self.susceptible[cell] + self.exposed_at(cell) + self.infected[cell] + self.resistant[cell]
    }

    pub fn total_infected(&self) -> i64 {
        self.infected.iter().map(|&i| i as i64).sum()
    }

    pub fn total_susceptible(&self) -> i64 {
        self.susceptible.iter().map(|&s| s as i64).sum()
    }

    pub fn total_died(&self) -> i64 {
        self.died.iter().map(|&d| d as i64).sum()
    }

    /// Remove up to `n` infected hosts at `cell`, taking them from the
    /// mortality cohorts.  Returns the per-cohort amounts removed.
    pub(crate) fn take_infected(&mut self, cell: Cell, n: i32) -> Vec<i32> {
        let n = n.min(self.infected[cell]).max(0);
        self.infected[cell] -= n;
        take_from_cohorts(&mut self.mortality_cohorts, cell, n)
    }

    /// Add infected hosts at `cell` with a known cohort breakdown.
    pub(crate) fn put_infected(&mut self, cell: Cell, by_cohort: &[i32]) {
        for (g, &x) in self.mortality_cohorts.iter_mut().zip(by_cohort) {
            g[cell] += x;
            self.infected[cell] += x;
        }
    }

    /// Add newly infected hosts at `cell` to the newest cohort.
    pub(crate) fn add_new_infected(&mut self, cell: Cell, n: i32) {
        self.infected[cell] += n;
        if let Some(newest) = self.mortality_cohorts.last_mut() {
            newest[cell] += n;
        }
    }

    /// Remove up to `n` exposed hosts at `cell` across cohorts.
    pub(crate) fn take_exposed(&mut self, cell: Cell, n: i32) -> i32 {
        let n = n.min(self.exposed_at(cell)).max(0);
        take_from_cohorts(&mut self.exposed, cell, n);
        n
    }

    /// Oldest exposed cohort becomes infected, then the cohorts shift.
    pub(crate) fn advance_exposed(&mut self) {
        if self.exposed.is_empty() {
            return;
        }
        let oldest = self.exposed.remove(0);
        for cell in oldest.iter_cells() {
            let n = oldest[cell];
            if n > 0 {
                self.add_new_infected(cell, n);
            }
        }
        let (rows, cols) = self.shape();
        self.exposed.push(Grid::new(rows, cols, 0));
    }

    /// Drop the (emptied) oldest mortality cohort and open a new one.
    pub(crate) fn rotate_mortality(&mut self) {
        if self.mortality_cohorts.len() <= 1 {
            return;
        }
        let mut oldest = self.mortality_cohorts.remove(0);
        // Survivors of the oldest slot, if any, join the next one.
        for (next, o) in self.mortality_cohorts[0].as_mut_slice().iter_mut().zip(oldest.as_slice()) {
            *next += *o;
        }
        oldest.fill(0);
        self.mortality_cohorts.push(oldest);
    }

    /// Every count is non-negative.
    pub fn check_invariants(&self) -> SimResult<()> {
        let mut grids: Vec<(&'static str, &Grid<i32>)> = vec![
            ("susceptible", &self.susceptible),
            ("infected", &self.infected),
            ("resistant", &self.resistant),
            ("died", &self.died),
        ];
        grids.extend(self.exposed.iter().map(|g| ("exposed cohort", g)));
        grids.extend(self.mortality_cohorts.iter().map(|g| ("mortality cohort", g)));
        for (name, grid) in grids {
            if let Some(cell) = grid.iter_cells().find(|&c| grid[c] < 0) {
                return Err(SimError::InvariantViolation { grid: name, cell, value: grid[cell] as i64 });
            }
        }
        Ok(())
    }
}

/// Remove `n` hosts at `cell` from `cohorts` in proportion to cohort size.
///
/// Each cohort gives `floor(n * c / total)`; the remainder comes one at a
/// time from the cohorts with the most left, oldest first on ties.  Returns
/// the amount taken from each cohort.
pub(crate) fn take_from_cohorts(cohorts: &mut [Grid<i32>], cell: Cell, n: i32) -> Vec<i32> {
    let counts: Vec<i32> = cohorts.iter().map(|g| g[cell].max(0)).collect();
    let taken = proportional_split(&counts, n);
    for (g, &t) in cohorts.iter_mut().zip(&taken) {
        g[cell] -= t;
    }
    taken
}

/// Split `n` across `counts` proportionally, never exceeding a count.
pub(crate) fn proportional_split(counts: &[i32], n: i32) -> Vec<i32> {
    let total: i64 = counts.iter().map(|&c| c as i64).sum();
    let n = (n as i64).min(total).max(0);
    if total == 0 || n == 0 {
        return vec![0; counts.len()];
    }
    let mut taken: Vec<i32> = counts.iter().map(|&c| (n * c as i64 / total) as i32).collect();
    let mut remainder = n - taken.iter().map(|&t| t as i64).sum::<i64>();
    while remainder > 0 {
        let mut best: Option<usize> = None;
        for (i, (&c, &t)) in counts.iter().zip(&taken).enumerate() {
            let left = c - t;
            if left > 0 && best.is_none_or(|b| left > counts[b] - taken[b]) {
                best = Some(i);
            }
        }
        let Some(b) = best else { break };
        taken[b] += 1;
        remainder -= 1;
    }
    taken
}
