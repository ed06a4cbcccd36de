//! Per-run deterministic random source.
//!
//! # Determinism strategy
//!
//! Every simulation run owns exactly one `SimRng`, seeded once from the
//! configured `random_seed`.  The engine threads a `&mut SimRng` through each
//! call that needs randomness and visits cells in row-major order, so a fixed
//! seed replays an identical stream of draws.  There is no global generator.
//!
//! Ensemble member `i` is an ordinary run seeded with `random_seed + i`, so
//! any member can be replayed on its own from its seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Above this mean, Poisson draws are split into chunks of at most this size.
const POISSON_CHUNK: f64 = 30.0;

/// Simulation-level RNG.  Owned by one run; not shared across threads.
#[derive(Debug)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform `f64` in `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Poisson-distributed count with mean `lambda`.
    ///
    /// Uses Knuth's product method; large means are split into chunks
    /// (the sum of independent Poisson variates is Poisson) to keep the
    /// product away from underflow.
    pub fn poisson(&mut self, lambda: f64) -> u64 {
        if !(lambda > 0.0) || !lambda.is_finite() {
            return 0;
        }
        let mut remaining = lambda;
        let mut total = 0u64;
        while remaining > 0.0 {
            let chunk = remaining.min(POISSON_CHUNK);
            remaining -= chunk;
            let limit = (-chunk).exp();
            let mut product = self.uniform();
            while product > limit {
                total += 1;
                product *= self.uniform();
            }
        }
        total
    }

    /// Binomial count of successes in `n` trials with probability `p`.
    pub fn binomial(&mut self, n: u64, p: f64) -> u64 {
        if p <= 0.0 {
            return 0;
        }
        if p >= 1.0 {
            return n;
        }
        (0..n).filter(|_| self.0.gen_bool(p)).count() as u64
    }

    /// Index drawn with probability proportional to `weights[i]`.
    ///
    /// Returns `None` if `weights` is empty or sums to zero.  Negative and
    /// non-finite weights count as zero.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let total: f64 = weights.iter().copied().map(clean).sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = self.uniform() * total;
        for (i, &w) in weights.iter().enumerate() {
            let w = clean(w);
            if target < w {
                return Some(i);
            }
            target -= w;
        }
        weights.iter().rposition(|&w| clean(w) > 0.0)
    }
}
