//! Distance-and-bearing dispersal.
//!
//! A disperser travels `|d|` map units, where `d` is drawn from a
//! [`Distribution`], along a bearing `θ` measured clockwise from north.
//! The bearing is uniform unless a compass direction with positive
//! concentration `kappa` is configured, in which case it follows a
//! von Mises law centred on that direction.

use std::f64::consts::{PI, TAU};

use pops_core::{Direction, SimRng};

use crate::{DispersalKernel, Distribution, KernelError, KernelResult, Origin};

/// Concentrations at or below this are treated as isotropic.
const KAPPA_EPSILON: f64 = 1e-6;

/// A sampled move before it is snapped to the grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Displacement {
    /// Radians clockwise from north, in `[0, 2π)`.
    pub angle:    f64,
    /// Map units, never negative.
    pub distance: f64,
}

#[derive(Clone, Debug)]
pub struct RadialKernel {
    distribution: Distribution,
    ew_res:       f64,
    ns_res:       f64,
    /// `(mu, kappa)` when the bearing is biased.
    bias:         Option<(f64, f64)>,
}

impl RadialKernel {
    /// `ew_res` / `ns_res` convert map units to columns and rows.
    pub fn new(distribution: Distribution, ew_res: f64, ns_res: f64) -> KernelResult<Self> {
        for (name, value) in [("ew_res", ew_res), ("ns_res", ns_res)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(KernelError::InvalidParameter { law: "radial", name, value });
            }
        }
        Ok(Self { distribution, ew_res, ns_res, bias: None })
    }

    /// Bias bearings toward `direction` with concentration `kappa`.
    ///
    /// `Direction::None` or a negligible `kappa` leaves bearings uniform.
    pub fn with_direction(mut self, direction: Direction, kappa: f64) -> KernelResult<Self> {
        if !kappa.is_finite() || kappa < 0.0 {
            return Err(KernelError::InvalidParameter { law: "von-mises", name: "kappa", value: kappa });
        }
        self.bias = match direction.radians() {
            Some(mu) if kappa > KAPPA_EPSILON => Some((mu, kappa)),
            _ => None,
        };
        Ok(self)
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn sample_displacement(&self, rng: &mut SimRng) -> Displacement {
        let distance = self.distribution.sample(rng).abs();
        let angle = match self.bias {
            Some((mu, kappa)) => von_mises(rng, mu, kappa),
            None => TAU * rng.uniform(),
        };
        Displacement { angle, distance }
    }

    /// Snap a displacement from `(row, col)` to a cell.  Rows grow southward.
    pub fn offset(&self, row: i64, col: i64, d: Displacement) -> (i64, i64) {
        let d_row = (d.distance * d.angle.cos() / self.ns_res).round();
        let d_col = (d.distance * d.angle.sin() / self.ew_res).round();
        (saturating_offset(row, -d_row), saturating_offset(col, d_col))
    }
}

impl DispersalKernel for RadialKernel {
    fn sample(&mut self, rng: &mut SimRng, origin: Origin) -> (i64, i64) {
        let d = self.sample_displacement(rng);
        self.offset(origin.row, origin.col, d)
    }
}

/// Add a rounded float step, saturating instead of overflowing on huge
/// (heavy-tailed) distances.
fn saturating_offset(base: i64, step: f64) -> i64 {
    if step.is_nan() {
        return base;
    }
    // `as` saturates at the i64 range.
    base.saturating_add(step as i64)
}

/// Von Mises variate with mean `mu` and concentration `kappa`, wrapped to
/// `[0, 2π)`.  Best & Fisher (1979) rejection sampler.
pub fn von_mises(rng: &mut SimRng, mu: f64, kappa: f64) -> f64 {
    if kappa <= KAPPA_EPSILON {
        return TAU * rng.uniform();
    }
    let a = 1.0 + (1.0 + 4.0 * kappa * kappa).sqrt();
    let b = (a - (2.0 * a).sqrt()) / (2.0 * kappa);
    let r = (1.0 + b * b) / (2.0 * b);
    let f = loop {
        let z = (PI * rng.uniform()).cos();
        let f = (1.0 + r * z) / (r + z);
        let c = kappa * (r - f);
        let u = 1.0 - rng.uniform();
        if u < c * (2.0 - c) || (c / u).ln() + 1.0 - c >= 0.0 {
            break f;
        }
    };
    let sign = if rng.uniform() < 0.5 { -1.0 } else { 1.0 };
    let theta = mu + sign * f.clamp(-1.0, 1.0).acos();
    theta.rem_euclid(TAU)
}
