//! One-dimensional dispersal-distance distributions.
//!
//! Every law exposes the same three operations:
//!
//! | Operation     | Used by                                                |
//! |---------------|--------------------------------------------------------|
//! | `sample(rng)` | [`RadialKernel`](crate::RadialKernel), per disperser  |
//! | `pdf(x)`      | [`DeterministicKernel`](crate::DeterministicKernel) window weights |
//! | `icdf(p)`     | deterministic window radius (`icdf(dispersal_percentage)`) |
//!
//! Parameters are validated once, at construction.  After that, none of the
//! operations can fail: out-of-domain inputs yield `0.0` (pdf) or a boundary
//! value (icdf).
//!
//! # Parameter mapping from kernel configuration
//!
//! | Law               | `scale`        | `shape`          |
//! |-------------------|----------------|------------------|
//! | Cauchy            | scale          | –                |
//! | Exponential       | mean distance  | –                |
//! | ExponentialPower  | α (scale)      | β (shape)        |
//! | Gamma             | θ (scale)      | k (shape)        |
//! | HyperbolicSecant  | σ              | –                |
//! | Logistic          | s              | –                |
//! | LogNormal         | σ (of ln x)    | –                |
//! | Normal            | σ (mean 0)     | –                |
//! | PowerLaw          | x_min          | α (> 1)          |
//! | Weibull           | λ (scale)      | k (shape)        |

use std::f64::consts::{PI, SQRT_2};

use pops_core::SimRng;

use crate::math::{erf_inv, gamma, gamma_p, ln_gamma, standard_gamma, standard_normal};
use crate::{KernelError, KernelResult, KernelType};

/// Bisection steps for the numeric gamma quantile.
const GAMMA_ICDF_ITERATIONS: usize = 200;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Distribution {
    Cauchy { scale: f64 },
    Exponential { scale: f64 },
    ExponentialPower { alpha: f64, beta: f64 },
    Gamma { shape: f64, scale: f64 },
    HyperbolicSecant { sigma: f64 },
    Logistic { scale: f64 },
    LogNormal { sigma: f64 },
    Normal { mean: f64, sigma: f64 },
    PowerLaw { xmin: f64, alpha: f64 },
    Weibull { shape: f64, scale: f64 },
}

fn positive(law: &'static str, name: &'static str, value: f64) -> KernelResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(KernelError::InvalidParameter { law, name, value })
    }
}

impl Distribution {
    // ── Constructors ──────────────────────────────────────────────────────

    pub fn cauchy(scale: f64) -> KernelResult<Self> {
        Ok(Self::Cauchy { scale: positive("cauchy", "scale", scale)? })
    }

    pub fn exponential(scale: f64) -> KernelResult<Self> {
        Ok(Self::Exponential { scale: positive("exponential", "scale", scale)? })
    }

    pub fn exponential_power(alpha: f64, beta: f64) -> KernelResult<Self> {
        Ok(Self::ExponentialPower {
            alpha: positive("exponential-power", "scale", alpha)?,
            beta:  positive("exponential-power", "shape", beta)?,
        })
    }

    pub fn gamma(shape: f64, scale: f64) -> KernelResult<Self> {
        Ok(Self::Gamma {
            shape: positive("gamma", "shape", shape)?,
            scale: positive("gamma", "scale", scale)?,
        })
    }

    pub fn hyperbolic_secant(sigma: f64) -> KernelResult<Self> {
        Ok(Self::HyperbolicSecant { sigma: positive("hyperbolic-secant", "scale", sigma)? })
    }

    pub fn logistic(scale: f64) -> KernelResult<Self> {
        Ok(Self::Logistic { scale: positive("logistic", "scale", scale)? })
    }

    pub fn log_normal(sigma: f64) -> KernelResult<Self> {
        Ok(Self::LogNormal { sigma: positive("log-normal", "scale", sigma)? })
    }

    pub fn normal(mean: f64, sigma: f64) -> KernelResult<Self> {
        if !mean.is_finite() {
            return Err(KernelError::InvalidParameter { law: "normal", name: "mean", value: mean });
        }
        Ok(Self::Normal { mean, sigma: positive("normal", "scale", sigma)? })
    }

    pub fn power_law(xmin: f64, alpha: f64) -> KernelResult<Self> {
        let xmin = positive("power-law", "scale", xmin)?;
        if !(alpha.is_finite() && alpha > 1.0) {
            return Err(KernelError::InvalidParameter { law: "power-law", name: "shape", value: alpha });
        }
        Ok(Self::PowerLaw { xmin, alpha })
    }

    pub fn weibull(shape: f64, scale: f64) -> KernelResult<Self> {
        Ok(Self::Weibull {
            shape: positive("weibull", "shape", shape)?,
            scale: positive("weibull", "scale", scale)?,
        })
    }

    /// Build the law named by a kernel type from configured scale and shape.
    ///
    /// Fails for kernel types that are not distance distributions
    /// (uniform, deterministic-neighbor, network).
    pub fn from_kernel_type(kind: KernelType, scale: f64, shape: f64) -> KernelResult<Self> {
        match kind {
            KernelType::Cauchy => Self::cauchy(scale),
            KernelType::Exponential => Self::exponential(scale),
            KernelType::ExponentialPower => Self::exponential_power(scale, shape),
            KernelType::Gamma => Self::gamma(shape, scale),
            KernelType::HyperbolicSecant => Self::hyperbolic_secant(scale),
            KernelType::Logistic => Self::logistic(scale),
            KernelType::LogNormal => Self::log_normal(scale),
            KernelType::Normal => Self::normal(0.0, scale),
            KernelType::PowerLaw => Self::power_law(scale, shape),
            KernelType::Weibull => Self::weibull(shape, scale),
            other => Err(KernelError::Config(format!("{other} is not a distance distribution"))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cauchy { .. } => "cauchy",
            Self::Exponential { .. } => "exponential",
            Self::ExponentialPower { .. } => "exponential-power",
            Self::Gamma { .. } => "gamma",
            Self::HyperbolicSecant { .. } => "hyperbolic-secant",
            Self::Logistic { .. } => "logistic",
            Self::LogNormal { .. } => "log-normal",
            Self::Normal { .. } => "normal",
            Self::PowerLaw { .. } => "power-law",
            Self::Weibull { .. } => "weibull",
        }
    }

    // ── Density ───────────────────────────────────────────────────────────

    /// Probability density at `x`.
    pub fn pdf(&self, x: f64) -> f64 {
        match *self {
            Self::Cauchy { scale } => 1.0 / (scale * PI * (1.0 + (x / scale).powi(2))),
            Self::Exponential { scale } => {
                if x < 0.0 { 0.0 } else { (-x / scale).exp() / scale }
            }
            Self::ExponentialPower { alpha, beta } => {
                beta / (2.0 * alpha * gamma(1.0 / beta)) * (-(x.abs() / alpha).powf(beta)).exp()
            }
            Self::Gamma { shape, scale } => {
                if x < 0.0 {
                    0.0
                } else if x == 0.0 {
                    match shape.partial_cmp(&1.0) {
                        Some(std::cmp::Ordering::Less) => f64::INFINITY,
                        Some(std::cmp::Ordering::Equal) => 1.0 / scale,
                        _ => 0.0,
                    }
                } else {
                    ((shape - 1.0) * x.ln() - x / scale - ln_gamma(shape) - shape * scale.ln()).exp()
                }
            }
            Self::HyperbolicSecant { sigma } => {
                1.0 / (2.0 * sigma) / (PI * x / (2.0 * sigma)).cosh()
            }
            Self::Logistic { scale } => {
                let e = (-x / scale).exp();
                e / (scale * (1.0 + e).powi(2))
            }
            Self::LogNormal { sigma } => {
                if x <= 0.0 {
                    0.0
                } else {
                    (-(x.ln().powi(2)) / (2.0 * sigma * sigma)).exp() / (x * sigma * (2.0 * PI).sqrt())
                }
            }
            Self::Normal { mean, sigma } => {
                (-0.5 * ((x - mean) / sigma).powi(2)).exp() / (sigma * (2.0 * PI).sqrt())
            }
            Self::PowerLaw { xmin, alpha } => {
                if x < xmin { 0.0 } else { (alpha - 1.0) / xmin * (x / xmin).powf(-alpha) }
            }
            Self::Weibull { shape, scale } => {
                if x < 0.0 {
                    0.0
                } else {
                    shape / scale * (x / scale).powf(shape - 1.0) * (-(x / scale).powf(shape)).exp()
                }
            }
        }
    }

    // ── Quantile ──────────────────────────────────────────────────────────

    /// Inverse CDF at probability `p` (clamped to `[0, 1]`).
    pub fn icdf(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        match *self {
            Self::Cauchy { scale } => scale * (PI * (p - 0.5)).tan(),
            Self::Exponential { scale } => -scale * (1.0 - p).ln(),
            Self::ExponentialPower { alpha, beta } => {
                let g = gamma_icdf(1.0 / beta, 1.0, 2.0 * (p - 0.5).abs());
                (p - 0.5).signum() * alpha * g.powf(1.0 / beta)
            }
            Self::Gamma { shape, scale } => gamma_icdf(shape, scale, p),
            Self::HyperbolicSecant { sigma } => 2.0 * sigma / PI * (PI * p / 2.0).tan().ln(),
            Self::Logistic { scale } => scale * (p / (1.0 - p)).ln(),
            Self::LogNormal { sigma } => (SQRT_2 * sigma * erf_inv(2.0 * p - 1.0)).exp(),
            Self::Normal { mean, sigma } => mean + sigma * SQRT_2 * erf_inv(2.0 * p - 1.0),
            Self::PowerLaw { xmin, alpha } => xmin * (1.0 - p).powf(1.0 / (1.0 - alpha)),
            Self::Weibull { shape, scale } => scale * (-(1.0 - p).ln()).powf(1.0 / shape),
        }
    }

    // ── Sampling ──────────────────────────────────────────────────────────

    /// Draw one variate.  Dispersal uses `sample(rng).abs()` as a distance.
    pub fn sample(&self, rng: &mut SimRng) -> f64 {
        match *self {
            Self::Gamma { shape, scale } => standard_gamma(rng, shape) * scale,
            Self::ExponentialPower { alpha, beta } => {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                sign * alpha * standard_gamma(rng, 1.0 / beta).powf(1.0 / beta)
            }
            Self::LogNormal { sigma } => (sigma * standard_normal(rng)).exp(),
            Self::Normal { mean, sigma } => mean + sigma * standard_normal(rng),
            // Remaining laws invert a uniform draw.  U lies in [0, 1); zero is
            // nudged up since some quantiles diverge at p = 0.
            _ => {
                let u = rng.uniform();
                self.icdf(u.max(f64::MIN_POSITIVE))
            }
        }
    }
}

/// Quantile of Gamma(`shape`, `scale`) by bracketing and bisection on the
/// regularised incomplete gamma function.
fn gamma_icdf(shape: f64, scale: f64, p: f64) -> f64 {
    if p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    let mut lo = 0.0;
    let mut hi = shape.max(1.0);
    while gamma_p(shape, hi) < p {
        lo = hi;
        hi *= 2.0;
        if !hi.is_finite() {
            return f64::INFINITY;
        }
    }
    for _ in 0..GAMMA_ICDF_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if gamma_p(shape, mid) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= f64::EPSILON * hi {
            break;
        }
    }
    0.5 * (lo + hi) * scale
}
