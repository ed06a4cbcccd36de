//! Kernels without a distance law: fixed one-cell steps, uniform grid-wide
//! jumps, and network travel.

use std::sync::Arc;

use pops_core::{Cell, Direction, SimRng};
use pops_network::Network;

use crate::{DispersalKernel, KernelError, KernelResult, Origin};

// ── DeterministicNeighborKernel ───────────────────────────────────────────────

/// Always moves one cell in a fixed compass direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeterministicNeighborKernel {
    direction: Direction,
    step:      (i64, i64),
}

impl DeterministicNeighborKernel {
    pub fn new(direction: Direction) -> KernelResult<Self> {
        let step = direction.offset().ok_or_else(|| {
            KernelError::Config("deterministic-neighbor kernel needs a compass direction".into())
        })?;
        Ok(Self { direction, step })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl DispersalKernel for DeterministicNeighborKernel {
    fn sample(&mut self, _rng: &mut SimRng, origin: Origin) -> (i64, i64) {
        (origin.row + self.step.0, origin.col + self.step.1)
    }
}

// ── UniformKernel ─────────────────────────────────────────────────────────────

/// Lands anywhere in the grid with equal probability.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UniformKernel {
    rows: i64,
    cols: i64,
}

impl UniformKernel {
    pub fn new(rows: usize, cols: usize) -> KernelResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(KernelError::Config(format!("uniform kernel over empty {rows}x{cols} grid")));
        }
        Ok(Self { rows: rows as i64, cols: cols as i64 })
    }
}

impl DispersalKernel for UniformKernel {
    fn sample(&mut self, rng: &mut SimRng, _origin: Origin) -> (i64, i64) {
        (rng.gen_range(0..self.rows), rng.gen_range(0..self.cols))
    }
}

// ── NetworkKernel ─────────────────────────────────────────────────────────────

/// Travels along the transport network for a uniformly drawn distance.
///
/// Only cells with a network node are eligible origins.
#[derive(Clone, Debug)]
pub struct NetworkKernel {
    network:      Arc<Network>,
    min_distance: f64,
    max_distance: f64,
}

impl NetworkKernel {
    pub fn new(network: Arc<Network>, min_distance: f64, max_distance: f64) -> KernelResult<Self> {
        if !(min_distance.is_finite() && min_distance >= 0.0) {
            return Err(KernelError::InvalidParameter {
                law:   "network",
                name:  "min_distance",
                value: min_distance,
            });
        }
        if !max_distance.is_finite() || max_distance < min_distance {
            return Err(KernelError::Config(format!(
                "network distance range [{min_distance}, {max_distance}] is inverted"
            )));
        }
        Ok(Self { network, min_distance, max_distance })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }
}

impl DispersalKernel for NetworkKernel {
    fn sample(&mut self, rng: &mut SimRng, origin: Origin) -> (i64, i64) {
        let Some(start) = Cell::from_signed(origin.row, origin.col) else {
            return (origin.row, origin.col);
        };
        let distance = self.min_distance + (self.max_distance - self.min_distance) * rng.uniform();
        self.network.travel(start, distance, rng).signed()
    }

    fn is_cell_eligible(&self, row: i64, col: i64) -> bool {
        Cell::from_signed(row, col).is_some_and(|c| self.network.has_node_at(c))
    }
}
