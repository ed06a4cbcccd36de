//! Kernel configuration and assembly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use pops_core::Direction;
use pops_network::Network;

use crate::{
    DeterministicBranch, DeterministicKernel, DeterministicNeighborKernel, Distribution, KernelError,
    KernelResult, KernelType, NaturalAnthropogenicKernel, NetworkKernel, RadialKernel,
    StochasticKernel, SwitchKernel, UniformKernel,
};

fn one() -> f64 {
    1.0
}

/// One kernel as written in a configuration file.
///
/// ```yaml
/// kind: cauchy
/// scale: 20.0
/// direction: NE
/// kappa: 2.0
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    pub kind: KernelType,
    #[serde(default = "one")]
    pub scale: f64,
    /// Second parameter of two-parameter laws; ignored by the others.
    #[serde(default = "one")]
    pub shape: f64,
    #[serde(default)]
    pub direction: Direction,
    /// Von Mises concentration around `direction`.  `0` is isotropic.
    #[serde(default)]
    pub kappa: f64,
}

impl KernelConfig {
    pub fn new(kind: KernelType, scale: f64) -> Self {
        Self { kind, scale, shape: 1.0, direction: Direction::None, kappa: 0.0 }
    }

    pub fn with_shape(mut self, shape: f64) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_direction(mut self, direction: Direction, kappa: f64) -> Self {
        self.direction = direction;
        self.kappa = kappa;
        self
    }

    /// Check parameters without needing a grid or network.
    pub fn validate(&self) -> KernelResult<()> {
        if !self.kappa.is_finite() || self.kappa < 0.0 {
            return Err(KernelError::InvalidParameter {
                law:   "von-mises",
                name:  "kappa",
                value: self.kappa,
            });
        }
        match self.kind {
            KernelType::DeterministicNeighbor => {
                DeterministicNeighborKernel::new(self.direction).map(|_| ())
            }
            KernelType::Uniform | KernelType::Network => Ok(()),
            kind => Distribution::from_kernel_type(kind, self.scale, self.shape).map(|_| ()),
        }
    }
}

/// Landscape facts a kernel needs beyond its own parameters.
#[derive(Clone, Debug)]
pub struct KernelContext {
    pub rows:                 usize,
    pub cols:                 usize,
    pub ew_res:               f64,
    pub ns_res:               f64,
    /// Mass covered by the deterministic window.
    pub dispersal_percentage: f64,
    pub deterministic:        bool,
    pub network:              Option<Arc<Network>>,
    pub network_min_distance: f64,
    pub network_max_distance: f64,
}

impl KernelContext {
    pub fn new(rows: usize, cols: usize, ew_res: f64, ns_res: f64) -> Self {
        Self {
            rows,
            cols,
            ew_res,
            ns_res,
            dispersal_percentage: 0.99,
            deterministic: false,
            network: None,
            network_min_distance: 0.0,
            network_max_distance: 0.0,
        }
    }
}

/// Assemble the switch kernel described by `cfg`.
///
/// The deterministic window is only built when `ctx.deterministic` is set,
/// since heavy-tailed laws can produce very large windows.
pub fn build_switch_kernel(cfg: &KernelConfig, ctx: &KernelContext) -> KernelResult<SwitchKernel> {
    cfg.validate()?;
    let kernel = match cfg.kind {
        KernelType::Uniform => {
            SwitchKernel::stochastic(StochasticKernel::Uniform(UniformKernel::new(ctx.rows, ctx.cols)?))
        }
        KernelType::Network => {
            let network = ctx.network.clone().ok_or_else(|| {
                KernelError::Config("network kernel configured without a network".into())
            })?;
            let k = NetworkKernel::new(network, ctx.network_min_distance, ctx.network_max_distance)?;
            SwitchKernel::stochastic(StochasticKernel::Network(k))
        }
        KernelType::DeterministicNeighbor => {
            let k = DeterministicNeighborKernel::new(cfg.direction)?;
            SwitchKernel::new(
                StochasticKernel::Neighbor(k),
                Some(DeterministicBranch::Neighbor(k)),
                ctx.deterministic,
            )
        }
        kind => {
            let dist = Distribution::from_kernel_type(kind, cfg.scale, cfg.shape)?;
            let radial = RadialKernel::new(dist, ctx.ew_res, ctx.ns_res)?
                .with_direction(cfg.direction, cfg.kappa)?;
            let branch = if ctx.deterministic {
                Some(DeterministicBranch::Window(DeterministicKernel::new(
                    &dist,
                    ctx.dispersal_percentage,
                    ctx.ew_res,
                    ctx.ns_res,
                )?))
            } else {
                None
            };
            SwitchKernel::new(StochasticKernel::Radial(radial), branch, ctx.deterministic)
        }
    };
    Ok(kernel)
}

/// Assemble the full natural/anthropogenic kernel.
pub fn build_kernel(
    natural:         &KernelConfig,
    anthropogenic:   Option<&KernelConfig>,
    percent_natural: f64,
    ctx:             &KernelContext,
) -> KernelResult<NaturalAnthropogenicKernel> {
    let natural = build_switch_kernel(natural, ctx)?;
    let anthropogenic = anthropogenic.map(|cfg| build_switch_kernel(cfg, ctx)).transpose()?;
    NaturalAnthropogenicKernel::new(natural, anthropogenic, percent_natural)
}
