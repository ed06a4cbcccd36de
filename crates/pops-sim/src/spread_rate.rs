//! Spread rate from the infection bounding box.
//!
//! On each day flagged by `spread_rate_schedule` the bounding box of infected
//! cells is recorded and compared with the previous one.  The rate for each
//! edge is the distance it advanced, in map units per action step:
//!
//! ```text
//! north = (n_prev − n) × ns_res        south = (s − s_prev) × ns_res
//! east  = (e − e_prev) × ew_res        west  = (w_prev − w) × ew_res
//! ```
//!
//! A rate is NaN when it is undefined: no infection in either box, or an
//! edge that did not move while touching the grid border (the infection may
//! have spread past it).

use pops_core::{Grid, GridAccess};

// ── BBox ──────────────────────────────────────────────────────────────────────

/// Inclusive cell bounding box.  `north <= south`, `west <= east`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BBox {
    pub north: usize,
    pub south: usize,
    pub east:  usize,
    pub west:  usize,
}

/// Bounding box of cells with `infected > 0`, or `None` if there are none.
pub fn infection_boundary(infected: &Grid<i32>) -> Option<BBox> {
    infected.iter_cells().filter(|&c| infected[c] > 0).fold(None, |acc, c| {
        Some(match acc {
            None => BBox { north: c.row, south: c.row, east: c.col, west: c.col },
            Some(b) => BBox {
                north: b.north.min(c.row),
                south: b.south.max(c.row),
                east:  b.east.max(c.col),
                west:  b.west.min(c.col),
            },
        })
    })
}

// ── Rate ──────────────────────────────────────────────────────────────────────

/// Advance of each bounding-box edge over one step.
#[derive(Copy, Clone, Debug)]
pub struct Rate {
    pub north: f64,
    pub south: f64,
    pub east:  f64,
    pub west:  f64,
}

impl Rate {
    pub const UNDEFINED: Rate = Rate { north: f64::NAN, south: f64::NAN, east: f64::NAN, west: f64::NAN };

    pub fn as_array(&self) -> [f64; 4] {
        [self.north, self.south, self.east, self.west]
    }
}

impl PartialEq for Rate {
    /// NaN equals NaN here, so undefined rates compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.as_array()
            .iter()
            .zip(other.as_array())
            .all(|(a, b)| a == &b || (a.is_nan() && b.is_nan()))
    }
}

// ── SpreadRate ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct SpreadRate {
    rows:       usize,
    cols:       usize,
    ew_res:     f64,
    ns_res:     f64,
    /// `boundaries[0]` is the initial state, `boundaries[k + 1]` follows step `k`.
    boundaries: Vec<Option<BBox>>,
    rates:      Vec<Rate>,
}

impl SpreadRate {
    /// Tracker for `num_steps` steps, starting from the initial infection.
    pub fn new(infected: &Grid<i32>, ew_res: f64, ns_res: f64, num_steps: usize) -> Self {
        let mut boundaries = vec![None; num_steps + 1];
        boundaries[0] = infection_boundary(infected);
        Self {
            rows: infected.rows(),
            cols: infected.cols(),
            ew_res,
            ns_res,
            boundaries,
            rates: vec![Rate::UNDEFINED; num_steps],
        }
    }

    pub fn num_steps(&self) -> usize {
        self.rates.len()
    }

    /// Record the state after step `step`.  Steps past the end are ignored.
    pub fn record(&mut self, infected: &Grid<i32>, step: usize) {
        if step >= self.rates.len() {
            return;
        }
        let bbox = infection_boundary(infected);
        self.boundaries[step + 1] = bbox;
        let (Some(prev), Some(now)) = (self.boundaries[step], bbox) else {
            self.rates[step] = Rate::UNDEFINED;
            return;
        };

        let advance = |from: usize, to: usize, res: f64| (to as f64 - from as f64) * res;
        let edge = |rate: f64, at_border: bool| if rate == 0.0 && at_border { f64::NAN } else { rate };
        self.rates[step] = Rate {
            north: edge(advance(now.north, prev.north, self.ns_res), now.north == 0),
            south: edge(advance(prev.south, now.south, self.ns_res), now.south + 1 == self.rows),
            east:  edge(advance(prev.east, now.east, self.ew_res), now.east + 1 == self.cols),
            west:  edge(advance(now.west, prev.west, self.ew_res), now.west == 0),
        };
    }

    /// Rate for `step`, `None` past the end.
    pub fn step_rate(&self, step: usize) -> Option<Rate> {
        self.rates.get(step).copied()
    }

    pub fn rates(&self) -> &[Rate] {
        &self.rates
    }

    /// Recorded boxes, initial state first.
    pub fn boundaries(&self) -> &[Option<BBox>] {
        &self.boundaries
    }
}

/// Mean rate at `step` over an ensemble, ignoring NaN per edge.  An edge
/// with no defined rate in any run stays NaN.
pub fn average_spread_rate(runs: &[SpreadRate], step: usize) -> Rate {
    let mut sums = [0.0; 4];
    let mut counts = [0usize; 4];
    for rate in runs.iter().filter_map(|r| r.step_rate(step)) {
        for (k, v) in rate.as_array().into_iter().enumerate() {
            if !v.is_nan() {
                sums[k] += v;
                counts[k] += 1;
            }
        }
    }
    let mean = |k: usize| if counts[k] > 0 { sums[k] / counts[k] as f64 } else { f64::NAN };
    Rate { north: mean(0), south: mean(1), east: mean(2), west: mean(3) }
}
