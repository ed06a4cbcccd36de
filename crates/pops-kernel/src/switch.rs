//! Kernel composition: the stochastic/deterministic switch and the
//! natural/anthropogenic mixture.

use pops_core::SimRng;

use crate::{
    DeterministicKernel, DeterministicNeighborKernel, DispersalKernel, KernelError, KernelResult,
    NetworkKernel, Origin, RadialKernel, UniformKernel,
};

// ── Sub-kernels ───────────────────────────────────────────────────────────────

/// Kernels usable in stochastic mode.
#[derive(Clone, Debug)]
pub enum StochasticKernel {
    Radial(RadialKernel),
    Uniform(UniformKernel),
    Network(NetworkKernel),
    Neighbor(DeterministicNeighborKernel),
}

impl DispersalKernel for StochasticKernel {
    fn sample(&mut self, rng: &mut SimRng, origin: Origin) -> (i64, i64) {
        match self {
            StochasticKernel::Radial(k) => k.sample(rng, origin),
            StochasticKernel::Uniform(k) => k.sample(rng, origin),
            StochasticKernel::Network(k) => k.sample(rng, origin),
            StochasticKernel::Neighbor(k) => k.sample(rng, origin),
        }
    }

    fn is_cell_eligible(&self, row: i64, col: i64) -> bool {
        match self {
            StochasticKernel::Network(k) => k.is_cell_eligible(row, col),
            _ => true,
        }
    }
}

/// Kernels usable in deterministic mode.
#[derive(Clone, Debug)]
pub enum DeterministicBranch {
    Window(DeterministicKernel),
    Neighbor(DeterministicNeighborKernel),
}

impl DispersalKernel for DeterministicBranch {
    fn sample(&mut self, rng: &mut SimRng, origin: Origin) -> (i64, i64) {
        match self {
            DeterministicBranch::Window(k) => k.sample(rng, origin),
            DeterministicBranch::Neighbor(k) => k.sample(rng, origin),
        }
    }

    fn begin_day(&mut self) {
        if let DeterministicBranch::Window(k) = self {
            k.begin_day();
        }
    }
}

// ── SwitchKernel ──────────────────────────────────────────────────────────────

/// Chooses between a stochastic and a deterministic sub-kernel with a flag
/// fixed at construction.
///
/// In deterministic mode without a deterministic branch (uniform and
/// network kernels have none) the stochastic kernel is used.
#[derive(Clone, Debug)]
pub struct SwitchKernel {
    deterministic:        bool,
    stochastic:           StochasticKernel,
    deterministic_branch: Option<DeterministicBranch>,
}

impl SwitchKernel {
    /// A switch that always samples `stochastic`.
    pub fn stochastic(stochastic: StochasticKernel) -> Self {
        Self { deterministic: false, stochastic, deterministic_branch: None }
    }

    pub fn new(
        stochastic:           StochasticKernel,
        deterministic_branch: Option<DeterministicBranch>,
        deterministic:        bool,
    ) -> Self {
        Self { deterministic, stochastic, deterministic_branch }
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic && self.deterministic_branch.is_some()
    }
}

impl DispersalKernel for SwitchKernel {
    fn sample(&mut self, rng: &mut SimRng, origin: Origin) -> (i64, i64) {
        match (&mut self.deterministic_branch, self.deterministic) {
            (Some(branch), true) => branch.sample(rng, origin),
            _ => self.stochastic.sample(rng, origin),
        }
    }

    fn is_cell_eligible(&self, row: i64, col: i64) -> bool {
        self.stochastic.is_cell_eligible(row, col)
    }

    fn begin_day(&mut self) {
        if let Some(branch) = &mut self.deterministic_branch {
            branch.begin_day();
        }
    }
}

// ── NaturalAnthropogenicKernel ────────────────────────────────────────────────

/// Mixture of a natural (short-range) and an optional anthropogenic
/// (long-range) kernel.
///
/// For each disperser the anthropogenic kernel is used when it exists, is
/// eligible at the origin, and a `percent_natural` Bernoulli draw fails.
/// No draw is made when the anthropogenic kernel is absent or ineligible,
/// so a natural-only mixture replays its natural kernel draw for draw.
#[derive(Clone, Debug)]
pub struct NaturalAnthropogenicKernel {
    natural:         SwitchKernel,
    anthropogenic:   Option<SwitchKernel>,
    percent_natural: f64,
}

impl NaturalAnthropogenicKernel {
    pub fn new(
        natural:         SwitchKernel,
        anthropogenic:   Option<SwitchKernel>,
        percent_natural: f64,
    ) -> KernelResult<Self> {
        if !(0.0..=1.0).contains(&percent_natural) {
            return Err(KernelError::InvalidParameter {
                law:   "natural-anthropogenic",
                name:  "percent_natural_dispersal",
                value: percent_natural,
            });
        }
        Ok(Self { natural, anthropogenic, percent_natural })
    }

    /// Natural-only mixture.
    pub fn natural_only(natural: SwitchKernel) -> Self {
        Self { natural, anthropogenic: None, percent_natural: 1.0 }
    }

    pub fn has_anthropogenic(&self) -> bool {
        self.anthropogenic.is_some()
    }
}

impl DispersalKernel for NaturalAnthropogenicKernel {
    fn sample(&mut self, rng: &mut SimRng, origin: Origin) -> (i64, i64) {
        if let Some(anthro) = &mut self.anthropogenic {
            if anthro.is_cell_eligible(origin.row, origin.col) && !rng.gen_bool(self.percent_natural) {
                return anthro.sample(rng, origin);
            }
        }
        self.natural.sample(rng, origin)
    }

    fn is_cell_eligible(&self, row: i64, col: i64) -> bool {
        self.natural.is_cell_eligible(row, col)
            || self.anthropogenic.as_ref().is_some_and(|a| a.is_cell_eligible(row, col))
    }

    fn begin_day(&mut self) {
        self.natural.begin_day();
        if let Some(anthro) = &mut self.anthropogenic {
            anthro.begin_day();
        }
    }
}
