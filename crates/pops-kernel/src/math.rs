//! Special functions used by the distribution family.
//!
//! The standard library has no `gamma`, `erf` or `erfinv`, and the
//! distributions need only modest accuracy (they shape dispersal windows
//! and distances on a grid), so the classic closed-form approximations are
//! used directly.

use std::f64::consts::PI;

use pops_core::SimRng;

/// Lanczos coefficients for `g = 7`, `n = 9`.
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function for `x > 0`.
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection formula.
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut a = LANCZOS[0];
    let t = x + 7.5;
    for (i, &c) in LANCZOS.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}

/// Gamma function for `x > 0`.
pub fn gamma(x: f64) -> f64 {
    ln_gamma(x).exp()
}

/// Inverse error function, Winitzki's approximation (`a = 0.147`).
///
/// Accurate to a few parts in 10³ over `(-1, 1)`; returns ±∞ at ±1.
pub fn erf_inv(x: f64) -> f64 {
    const A: f64 = 0.147;
    if x <= -1.0 {
        return f64::NEG_INFINITY;
    }
    if x >= 1.0 {
        return f64::INFINITY;
    }
    let ln = (1.0 - x * x).ln();
    let t1 = 2.0 / (PI * A) + ln / 2.0;
    let t2 = ln / A;
    x.signum() * ((t1 * t1 - t2).sqrt() - t1).sqrt()
}

/// Regularised lower incomplete gamma `P(a, x)`.
///
/// Series expansion below `a + 1`, Lentz continued fraction above.
pub fn gamma_p(a: f64, x: f64) -> f64 {
    const EPS: f64 = 1e-14;
    const MAX_ITER: usize = 500;
    if x <= 0.0 {
        return 0.0;
    }
    let ln_prefix = a * x.ln() - x - ln_gamma(a);
    if x < a + 1.0 {
        let mut term = 1.0 / a;
        let mut sum = term;
        let mut ap = a;
        for _ in 0..MAX_ITER {
            ap += 1.0;
            term *= x / ap;
            sum += term;
            if term.abs() < sum.abs() * EPS {
                break;
            }
        }
        (sum.ln() + ln_prefix).exp().min(1.0)
    } else {
        let tiny = 1e-300;
        let mut b = x + 1.0 - a;
        let mut c = 1.0 / tiny;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..MAX_ITER {
            let an = -(i as f64) * (i as f64 - a);
            b += 2.0;
            d = an * d + b;
            if d.abs() < tiny {
                d = tiny;
            }
            c = b + an / c;
            if c.abs() < tiny {
                c = tiny;
            }
            d = 1.0 / d;
            let delta = d * c;
            h *= delta;
            if (delta - 1.0).abs() < EPS {
                break;
            }
        }
        (1.0 - (h.ln() + ln_prefix).exp()).max(0.0)
    }
}

/// Standard normal variate via the Box–Muller transform.
pub fn standard_normal(rng: &mut SimRng) -> f64 {
    // 1 - U lies in (0, 1], keeping ln() finite.
    let u1 = 1.0 - rng.uniform();
    let u2 = rng.uniform();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Gamma(shape, 1) variate, Marsaglia–Tsang squeeze method.
pub fn standard_gamma(rng: &mut SimRng, shape: f64) -> f64 {
    if shape < 1.0 {
        // Boost: Gamma(k) = Gamma(k + 1) * U^(1/k).
        let u = 1.0 - rng.uniform();
        return standard_gamma(rng, shape + 1.0) * u.powf(1.0 / shape);
    }
    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    loop {
        let x = standard_normal(rng);
        let v = 1.0 + c * x;
        if v <= 0.0 {
            continue;
        }
        let v = v * v * v;
        let u = rng.uniform();
        if u < 1.0 - 0.0331 * x.powi(4) {
            return d * v;
        }
        if u > 0.0 && u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
}
