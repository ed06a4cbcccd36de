//! Independent stochastic runs of one configuration.
//!
//! Member `i` is seeded with `random_seed + i` (wrapping), so the ensemble is
//! reproducible and members never share a random stream.  With the
//! `parallel` feature members run on a Rayon pool of `threads` workers;
//! otherwise they run one after another and `threads` is ignored.

use tracing::info;

use crate::{Config, HostPool, Model, ModelBuilder, NoopObserver, RunOutput, SimResult, SnapshotMode};

/// Run `runs` models that differ only in seed.
pub fn run_ensemble(config: &Config, hosts: &HostPool, runs: usize, threads: usize) -> SimResult<Vec<RunOutput>> {
    run_ensemble_with(config.random_seed, runs, threads, |seed| {
        let config = Config { random_seed: seed, ..config.clone() };
        ModelBuilder::new(config, hosts.clone()).build()
    })
}

/// Run `runs` models built by `make`, which receives each member's seed.
///
/// Use this when members need optional inputs such as a network or
/// treatments.  Outputs are returned in member order.
pub fn run_ensemble_with<F>(base_seed: u64, runs: usize, threads: usize, make: F) -> SimResult<Vec<RunOutput>>
where
    F: Fn(u64) -> SimResult<Model> + Sync,
{
    info!(runs, threads, base_seed, "ensemble starting");
    let run_one = |i: usize| -> SimResult<RunOutput> {
        let mut model = make(base_seed.wrapping_add(i as u64))?;
        model.run(&mut NoopObserver, SnapshotMode::FinalOnly)
    };

    #[cfg(not(feature = "parallel"))]
    {
        let _ = threads;
        (0..runs).map(run_one).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| crate::SimError::Config(format!("cannot start ensemble thread pool: {e}")))?;
        pool.install(|| (0..runs).into_par_iter().map(run_one).collect())
    }
}
