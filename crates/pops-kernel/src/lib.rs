//! `pops-kernel` — where does a disperser land?
//!
//! Every kernel implements [`DispersalKernel`]: given the simulation RNG and
//! an [`Origin`] cell, return a destination `(row, col)`.  Destinations may
//! fall outside the grid; the spread engine handles them.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                   |
//! |--------------------|------------------------------------------------------------|
//! | [`distribution`]   | `Distribution` (ten distance laws: pdf, icdf, sampling)    |
//! | [`kernel`]         | `DispersalKernel` trait, `Origin`, `KernelType`            |
//! | [`radial`]         | `RadialKernel` (distance + bearing, von Mises bias)        |
//! | [`deterministic`]  | `DeterministicKernel` (probability window, no RNG)         |
//! | [`simple`]         | `DeterministicNeighborKernel`, `UniformKernel`, `NetworkKernel` |
//! | [`switch`]         | `SwitchKernel`, `NaturalAnthropogenicKernel`               |
//! | [`config`]         | `KernelConfig`, `KernelContext`, `build_switch_kernel`, `build_kernel` |
//! | [`error`]          | `KernelError`, `KernelResult<T>`                           |

pub mod config;
pub mod deterministic;
pub mod distribution;
pub mod error;
pub mod kernel;
mod math;
pub mod radial;
pub mod simple;
pub mod switch;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{build_kernel, build_switch_kernel, KernelConfig, KernelContext};
pub use deterministic::DeterministicKernel;
pub use distribution::Distribution;
pub use error::{KernelError, KernelResult};
pub use kernel::{DispersalKernel, KernelType, Origin};
pub use radial::{von_mises, Displacement, RadialKernel};
pub use simple::{DeterministicNeighborKernel, NetworkKernel, UniformKernel};
pub use switch::{DeterministicBranch, NaturalAnthropogenicKernel, StochasticKernel, SwitchKernel};
