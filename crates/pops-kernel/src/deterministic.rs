//! Deterministic window dispersal.
//!
//! # Algorithm
//!
//! At construction a square-ish window around a virtual origin is filled
//! with `|pdf(distance)|`, where distance is measured between cell centres
//! in map units, and the weights are normalised to sum to 1.  The window
//! half-size covers `icdf(dispersal_percentage)` map units in each axis.
//!
//! Dispersers from one origin then "spend" the window:
//!
//! ```text
//! if origin changed or a new day began:
//!     working = window; proportion = 1 / dispersers
//! cell = first argmax(working) in row-major order
//! working[cell] -= proportion
//! return origin + (cell - mid)
//! ```
//!
//! So `n` dispersers land on the `n` most probable cells, revisiting a cell
//! only once its share has been used up.  No randomness is involved.

use pops_core::{Grid, GridAccess, SimRng};

use crate::{DispersalKernel, Distribution, KernelError, KernelResult, Origin};

/// Largest window the kernel will allocate.
const MAX_WINDOW_CELLS: usize = 10_000_000;

#[derive(Clone, Debug)]
pub struct DeterministicKernel {
    window:     Grid<f64>,
    working:    Grid<f64>,
    mid_row:    usize,
    mid_col:    usize,
    proportion: f64,
    last:       Option<(i64, i64)>,
}

impl DeterministicKernel {
    /// Build the window for `distribution`.
    ///
    /// `dispersal_percentage` is the share of the distribution's mass the
    /// window must cover, in `(0, 1)`.
    pub fn new(
        distribution:         &Distribution,
        dispersal_percentage: f64,
        ew_res:               f64,
        ns_res:               f64,
    ) -> KernelResult<Self> {
        if !(dispersal_percentage > 0.0 && dispersal_percentage < 1.0) {
            return Err(KernelError::InvalidParameter {
                law:   distribution.name(),
                name:  "dispersal_percentage",
                value: dispersal_percentage,
            });
        }
        for (name, value) in [("ew_res", ew_res), ("ns_res", ns_res)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(KernelError::InvalidParameter { law: distribution.name(), name, value });
            }
        }

        let reach = distribution.icdf(dispersal_percentage).abs();
        let half_rows = half_size(reach, ns_res)?;
        let half_cols = half_size(reach, ew_res)?;
        let rows = 2 * half_rows + 1;
        let cols = 2 * half_cols + 1;
        if rows.saturating_mul(cols) > MAX_WINDOW_CELLS {
            return Err(KernelError::Config(format!(
                "{} window of {rows}x{cols} cells is too large; lower dispersal_percentage or scale",
                distribution.name()
            )));
        }

        let mut window = Grid::new(rows, cols, 0.0);
        let mut max_finite = 0.0f64;
        for cell in window.iter_cells() {
            let dy = (cell.row as f64 - half_rows as f64) * ns_res;
            let dx = (cell.col as f64 - half_cols as f64) * ew_res;
            let w = distribution.pdf(dx.hypot(dy)).abs();
            if w.is_finite() {
                max_finite = max_finite.max(w);
            }
            window[cell] = w;
        }
        // A density singularity at zero distance (gamma with shape < 1).
        for w in window.as_mut_slice() {
            if !w.is_finite() {
                *w = max_finite;
            }
        }
        let total: f64 = window.iter().sum();
        if !(total > 0.0) {
            return Err(KernelError::Config(format!(
                "{} window has zero total weight",
                distribution.name()
            )));
        }
        for w in window.as_mut_slice() {
            *w /= total;
        }

        Ok(Self {
            working: window.clone(),
            window,
            mid_row: half_rows,
            mid_col: half_cols,
            proportion: 1.0,
            last: None,
        })
    }

    /// Normalised window weights.
    pub fn window(&self) -> &Grid<f64> {
        &self.window
    }

    /// `(rows, cols)` of the window.
    pub fn window_shape(&self) -> (usize, usize) {
        (self.window.rows(), self.window.cols())
    }

    fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &w) in self.working.as_slice().iter().enumerate() {
            if w > self.working.as_slice()[best] {
                best = i;
            }
        }
        best
    }
}

fn half_size(reach: f64, res: f64) -> KernelResult<usize> {
    let cells = (reach / res).ceil();
    if !cells.is_finite() || cells > MAX_WINDOW_CELLS as f64 {
        return Err(KernelError::Config(format!(
            "dispersal window reach of {reach} map units cannot be represented"
        )));
    }
    Ok(cells.max(0.0) as usize)
}

impl DispersalKernel for DeterministicKernel {
    fn sample(&mut self, _rng: &mut SimRng, origin: Origin) -> (i64, i64) {
        if self.last != Some((origin.row, origin.col)) {
            self.working.as_mut_slice().copy_from_slice(self.window.as_slice());
            self.proportion = 1.0 / origin.dispersers.max(1) as f64;
            self.last = Some((origin.row, origin.col));
        }
        let i = self.argmax();
        self.working.as_mut_slice()[i] -= self.proportion;
        let cols = self.working.cols();
        let (row, col) = (i / cols, i % cols);
        (
            origin.row + row as i64 - self.mid_row as i64,
            origin.col + col as i64 - self.mid_col as i64,
        )
    }

    /// The next sample starts from a fresh window even at the same origin.
    fn begin_day(&mut self) {
        self.last = None;
    }
}
