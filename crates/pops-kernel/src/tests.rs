//! Unit tests for pops-kernel.

// ── Special functions ─────────────────────────────────────────────────────────

#[cfg(test)]
mod math {
    use crate::math::{erf_inv, gamma, gamma_p, ln_gamma};

    #[test]
    fn gamma_matches_factorials() {
        for (n, fact) in [(1.0, 1.0), (2.0, 1.0), (5.0, 24.0), (7.0, 720.0)] {
            assert!((gamma(n) - fact).abs() / fact < 1e-10, "gamma({n})");
        }
        assert!((gamma(0.5) - std::f64::consts::PI.sqrt()).abs() < 1e-10);
        assert!(ln_gamma(1.0).abs() < 1e-12);
    }

    #[test]
    fn erf_inv_is_odd_and_bounded() {
        assert_eq!(erf_inv(0.0), 0.0);
        assert!((erf_inv(0.5) + erf_inv(-0.5)).abs() < 1e-12);
        // erf(0.4769) = 0.5
        assert!((erf_inv(0.5) - 0.476_936).abs() < 2e-3);
        assert_eq!(erf_inv(1.0), f64::INFINITY);
    }

    #[test]
    fn gamma_p_shape_one_is_exponential_cdf() {
        for x in [0.1, 0.9, 2.0, 5.0, 12.0] {
            assert!((gamma_p(1.0, x) - (1.0 - (-x as f64).exp())).abs() < 1e-10, "x={x}");
        }
        assert_eq!(gamma_p(2.0, 0.0), 0.0);
    }
}

// ── Distributions ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod distribution {
    use pops_core::SimRng;

    use crate::{Distribution, KernelError, KernelType};

    fn integrate(d: &Distribution, lo: f64, hi: f64) -> f64 {
        let n = 200_000;
        let h = (hi - lo) / n as f64;
        (0..n).map(|i| d.pdf(lo + (i as f64 + 0.5) * h) * h).sum()
    }

    #[test]
    fn non_positive_parameters_rejected() {
        assert!(matches!(
            Distribution::cauchy(0.0),
            Err(KernelError::InvalidParameter { law: "cauchy", name: "scale", .. })
        ));
        assert!(Distribution::weibull(-1.0, 2.0).is_err());
        assert!(Distribution::gamma(2.0, f64::NAN).is_err());
        assert!(Distribution::power_law(1.0, 1.0).is_err());
        assert!(Distribution::normal(f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn non_distance_types_rejected() {
        assert!(Distribution::from_kernel_type(KernelType::Uniform, 1.0, 1.0).is_err());
        assert!(Distribution::from_kernel_type(KernelType::Network, 1.0, 1.0).is_err());
    }

    #[test]
    fn closed_form_quantiles() {
        let e = Distribution::exponential(3.0).unwrap();
        assert!((e.icdf(0.5) - 3.0 * 2f64.ln()).abs() < 1e-12);
        let c = Distribution::cauchy(2.0).unwrap();
        assert!(c.icdf(0.5).abs() < 1e-12);
        assert!((c.icdf(0.75) - 2.0).abs() < 1e-9);
        let l = Distribution::logistic(1.5).unwrap();
        assert!((l.icdf(0.75) - 1.5 * 3f64.ln()).abs() < 1e-12);
        let p = Distribution::power_law(2.0, 3.0).unwrap();
        assert_eq!(p.icdf(0.0), 2.0);
        assert!((p.icdf(0.75) - 4.0).abs() < 1e-12);
        let h = Distribution::hyperbolic_secant(1.0).unwrap();
        assert!(h.icdf(0.5).abs() < 1e-12);
    }

    #[test]
    fn weibull_shape_one_is_exponential() {
        let w = Distribution::weibull(1.0, 4.0).unwrap();
        let e = Distribution::exponential(4.0).unwrap();
        for p in [0.1, 0.5, 0.9, 0.99] {
            assert!((w.icdf(p) - e.icdf(p)).abs() < 1e-9);
        }
        assert!((w.pdf(2.0) - e.pdf(2.0)).abs() < 1e-12);
    }

    #[test]
    fn normal_quantiles_within_approximation() {
        let n = Distribution::normal(0.0, 2.0).unwrap();
        assert!(n.icdf(0.5).abs() < 1e-12);
        assert!((n.icdf(0.975) - 2.0 * 1.959_964).abs() < 0.02);
        let ln = Distribution::log_normal(1.0).unwrap();
        assert!((ln.icdf(0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn gamma_quantile_inverts_cdf() {
        let g = Distribution::gamma(1.0, 2.0).unwrap();
        for p in [0.05, 0.5, 0.95] {
            assert!((g.icdf(p) + 2.0 * (1.0 - p).ln()).abs() < 1e-6, "p={p}");
        }
        let g = Distribution::gamma(3.0, 1.0).unwrap();
        let median = g.icdf(0.5);
        // Median of Gamma(3, 1) is about 2.674.
        assert!((median - 2.674_06).abs() < 1e-3);
    }

    #[test]
    fn exponential_power_with_shape_two_is_normal() {
        // beta = 2, alpha = sqrt(2) * sigma reproduces N(0, sigma).
        let sigma = 1.5;
        let ep = Distribution::exponential_power(2f64.sqrt() * sigma, 2.0).unwrap();
        let n = Distribution::normal(0.0, sigma).unwrap();
        for x in [0.0, 0.7, 2.0, 4.0] {
            assert!((ep.pdf(x) - n.pdf(x)).abs() < 1e-9, "x={x}");
        }
        assert!(ep.icdf(0.5).abs() < 1e-9);
        assert!(ep.icdf(0.9) > 0.0 && ep.icdf(0.1) < 0.0);
    }

    #[test]
    fn densities_integrate_to_one() {
        let cases = [
            (Distribution::exponential(2.0).unwrap(), 0.0, 80.0),
            (Distribution::gamma(2.5, 1.5).unwrap(), 0.0, 80.0),
            (Distribution::weibull(1.7, 3.0).unwrap(), 0.0, 60.0),
            (Distribution::log_normal(0.5).unwrap(), 0.0, 40.0),
            (Distribution::normal(0.0, 1.0).unwrap(), -12.0, 12.0),
            (Distribution::logistic(1.0).unwrap(), -60.0, 60.0),
            (Distribution::hyperbolic_secant(1.0).unwrap(), -60.0, 60.0),
            (Distribution::exponential_power(2.0, 1.5).unwrap(), -60.0, 60.0),
        ];
        for (d, lo, hi) in cases {
            let mass = integrate(&d, lo, hi);
            assert!((mass - 1.0).abs() < 2e-3, "{} mass {mass}", d.name());
        }
    }

    #[test]
    fn out_of_support_density_is_zero() {
        assert_eq!(Distribution::exponential(1.0).unwrap().pdf(-1.0), 0.0);
        assert_eq!(Distribution::power_law(2.0, 2.5).unwrap().pdf(1.0), 0.0);
        assert_eq!(Distribution::log_normal(1.0).unwrap().pdf(0.0), 0.0);
    }

    #[test]
    fn sample_means_match() {
        let mut rng = SimRng::new(17);
        let n = 40_000;
        let g = Distribution::gamma(3.0, 2.0).unwrap();
        let mean: f64 = (0..n).map(|_| g.sample(&mut rng)).sum::<f64>() / n as f64;
        assert!((mean - 6.0).abs() < 0.15, "gamma mean {mean}");

        let e = Distribution::exponential(5.0).unwrap();
        let mean: f64 = (0..n).map(|_| e.sample(&mut rng)).sum::<f64>() / n as f64;
        assert!((mean - 5.0).abs() < 0.15, "exponential mean {mean}");

        let norm = Distribution::normal(1.0, 2.0).unwrap();
        let xs: Vec<f64> = (0..n).map(|_| norm.sample(&mut rng)).collect();
        let mean = xs.iter().sum::<f64>() / n as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 1.0).abs() < 0.05, "normal mean {mean}");
        assert!((var.sqrt() - 2.0).abs() < 0.05, "normal sd {}", var.sqrt());
    }

    #[test]
    fn samples_are_finite() {
        let mut rng = SimRng::new(3);
        let laws = [
            Distribution::cauchy(1.0).unwrap(),
            Distribution::hyperbolic_secant(1.0).unwrap(),
            Distribution::logistic(1.0).unwrap(),
            Distribution::power_law(1.0, 2.0).unwrap(),
            Distribution::exponential_power(1.0, 0.5).unwrap(),
            Distribution::gamma(0.4, 1.0).unwrap(),
        ];
        for d in laws {
            for _ in 0..5_000 {
                assert!(d.sample(&mut rng).is_finite(), "{}", d.name());
            }
        }
    }
}

// ── Kernel types ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod kernel_type {
    use crate::KernelType;

    #[test]
    fn parse_is_case_and_separator_insensitive() {
        assert_eq!("log_normal".parse::<KernelType>().unwrap(), KernelType::LogNormal);
        assert_eq!("Exponential-Power".parse::<KernelType>().unwrap(), KernelType::ExponentialPower);
        assert_eq!("DETERMINISTIC_NEIGHBOR".parse::<KernelType>().unwrap(), KernelType::DeterministicNeighbor);
        assert!("levy".parse::<KernelType>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for k in KernelType::ALL {
            assert_eq!(k.to_string().parse::<KernelType>().unwrap(), k);
        }
    }
}

// ── Kernels ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod kernels {
    use std::sync::Arc;

    use proptest::prelude::*;

    use pops_core::{Cell, Direction, SimRng};
    use pops_network::NetworkBuilder;

    use crate::{
        DeterministicKernel, DeterministicNeighborKernel, DispersalKernel, Distribution, NetworkKernel,
        Origin, RadialKernel, UniformKernel,
    };

    #[test]
    fn neighbor_steps_one_cell() {
        let mut rng = SimRng::new(0);
        let cases = [
            (Direction::N, (-1, 0)),
            (Direction::E, (0, 1)),
            (Direction::NE, (-1, 1)),
            (Direction::SW, (1, -1)),
        ];
        for (dir, (dr, dc)) in cases {
            let mut k = DeterministicNeighborKernel::new(dir).unwrap();
            assert_eq!(k.sample(&mut rng, Origin::new(5, 5)), (5 + dr, 5 + dc));
        }
        assert!(DeterministicNeighborKernel::new(Direction::None).is_err());
    }

    proptest! {
        #[test]
        fn neighbor_ignores_seed(seed in any::<u64>(), d in 0usize..8, row in -50i64..50, col in -50i64..50) {
            let dir = Direction::CLOCKWISE[d];
            let mut k = DeterministicNeighborKernel::new(dir).unwrap();
            let mut rng = SimRng::new(seed);
            let (dr, dc) = dir.offset().unwrap();
            prop_assert_eq!(k.sample(&mut rng, Origin::new(row, col)), (row + dr, col + dc));
        }
    }

    #[test]
    fn uniform_stays_in_grid() {
        let mut k = UniformKernel::new(4, 7).unwrap();
        let mut rng = SimRng::new(9);
        for _ in 0..1_000 {
            let (r, c) = k.sample(&mut rng, Origin::new(0, 0));
            assert!((0..4).contains(&r) && (0..7).contains(&c));
        }
        assert!(UniformKernel::new(0, 3).is_err());
    }

    #[test]
    fn radial_is_reproducible() {
        let dist = Distribution::cauchy(3.0).unwrap();
        let mut a = RadialKernel::new(dist, 1.0, 1.0).unwrap();
        let mut b = a.clone();
        let mut ra = SimRng::new(42);
        let mut rb = SimRng::new(42);
        for _ in 0..200 {
            assert_eq!(a.sample(&mut ra, Origin::new(10, 10)), b.sample(&mut rb, Origin::new(10, 10)));
        }
    }

    #[test]
    fn radial_offset_follows_compass() {
        let k = RadialKernel::new(Distribution::exponential(1.0).unwrap(), 10.0, 20.0).unwrap();
        let north = crate::Displacement { angle: 0.0, distance: 40.0 };
        assert_eq!(k.offset(5, 5, north), (3, 5));
        let east = crate::Displacement { angle: std::f64::consts::FRAC_PI_2, distance: 40.0 };
        assert_eq!(k.offset(5, 5, east), (5, 9));
    }

    #[test]
    fn von_mises_bias_points_downwind() {
        let k = RadialKernel::new(Distribution::exponential(10.0).unwrap(), 1.0, 1.0)
            .unwrap()
            .with_direction(Direction::E, 50.0)
            .unwrap();
        let mut rng = SimRng::new(4);
        let n = 2_000;
        let mut east = 0;
        for _ in 0..n {
            let d = k.sample_displacement(&mut rng);
            assert!((0.0..std::f64::consts::TAU).contains(&d.angle));
            if d.angle.sin() > 0.7 {
                east += 1;
            }
        }
        assert!(east > n * 95 / 100, "only {east} of {n} headed east");
    }

    #[test]
    fn negative_kappa_rejected() {
        let k = RadialKernel::new(Distribution::exponential(1.0).unwrap(), 1.0, 1.0).unwrap();
        assert!(k.with_direction(Direction::N, -1.0).is_err());
    }

    #[test]
    fn deterministic_window_spends_most_likely_cells_first() {
        let dist = Distribution::exponential(1.0).unwrap();
        let mut k = DeterministicKernel::new(&dist, 0.9, 1.0, 1.0).unwrap();
        // icdf(0.9) = ln 10 ≈ 2.3 cells, so a 7x7 window.
        assert_eq!(k.window_shape(), (7, 7));
        assert!((k.window().sum() - 1.0).abs() < 1e-12);

        let mut rng = SimRng::new(0);
        let origin = Origin::new(10, 10).with_dispersers(5);
        let landed: Vec<_> = (0..5).map(|_| k.sample(&mut rng, origin)).collect();
        assert_eq!(landed, vec![(10, 10), (9, 10), (10, 9), (10, 11), (11, 10)]);
    }

    #[test]
    fn deterministic_resets_on_new_origin() {
        let dist = Distribution::exponential(1.0).unwrap();
        let mut k = DeterministicKernel::new(&dist, 0.9, 1.0, 1.0).unwrap();
        let mut rng = SimRng::new(0);
        let a = Origin::new(3, 3).with_dispersers(10);
        // Centre holds ~0.17 of the mass, so with a share of 0.1 it is
        // picked twice before the nearest neighbour.
        assert_eq!(k.sample(&mut rng, a), (3, 3));
        assert_eq!(k.sample(&mut rng, a), (3, 3));
        assert_eq!(k.sample(&mut rng, a), (2, 3));
        let b = Origin::new(20, 1).with_dispersers(10);
        assert_eq!(k.sample(&mut rng, b), (20, 1));
    }

    #[test]
    fn deterministic_restarts_each_day() {
        let dist = Distribution::exponential(1.0).unwrap();
        let mut k = DeterministicKernel::new(&dist, 0.9, 1.0, 1.0).unwrap();
        let mut rng = SimRng::new(0);
        let a = Origin::new(3, 3).with_dispersers(10);
        let day = |k: &mut DeterministicKernel, rng: &mut SimRng| -> Vec<(i64, i64)> {
            k.begin_day();
            (0..3).map(|_| k.sample(rng, a)).collect()
        };
        let first = day(&mut k, &mut rng);
        assert_eq!(first, vec![(3, 3), (3, 3), (2, 3)]);
        assert_eq!(day(&mut k, &mut rng), first);
        assert_eq!(day(&mut k, &mut rng), first);
    }

    #[test]
    fn deterministic_ignores_rng() {
        let dist = Distribution::gamma(0.8, 2.0).unwrap();
        let mut a = DeterministicKernel::new(&dist, 0.95, 1.0, 1.0).unwrap();
        let mut b = a.clone();
        let mut ra = SimRng::new(1);
        let mut rb = SimRng::new(999);
        let o = Origin::new(0, 0).with_dispersers(30);
        for _ in 0..30 {
            assert_eq!(a.sample(&mut ra, o), b.sample(&mut rb, o));
        }
        // The singular density at zero was replaced by a finite weight.
        assert!(a.window().iter().all(|w| w.is_finite()));
    }

    #[test]
    fn deterministic_rejects_bad_percentage_and_huge_windows() {
        let dist = Distribution::exponential(1.0).unwrap();
        assert!(DeterministicKernel::new(&dist, 1.0, 1.0, 1.0).is_err());
        assert!(DeterministicKernel::new(&dist, 0.0, 1.0, 1.0).is_err());
        let wide = Distribution::cauchy(1_000.0).unwrap();
        assert!(DeterministicKernel::new(&wide, 0.999_999, 1.0, 1.0).is_err());
    }

    #[test]
    fn network_kernel_eligibility_and_travel() {
        let mut b = NetworkBuilder::new(1.0, 1.0);
        b.add_link(Cell::new(0, 0), Cell::new(0, 3), 1.0);
        let net = Arc::new(b.build().unwrap());
        let mut k = NetworkKernel::new(net.clone(), 3.0, 3.0).unwrap();
        assert!(k.is_cell_eligible(0, 0));
        assert!(!k.is_cell_eligible(5, 5));
        assert!(!k.is_cell_eligible(-1, 0));
        let mut rng = SimRng::new(2);
        assert_eq!(k.sample(&mut rng, Origin::new(0, 0)), (0, 3));

        assert!(NetworkKernel::new(net.clone(), 5.0, 1.0).is_err());
        assert!(NetworkKernel::new(net, -1.0, 1.0).is_err());
    }
}

// ── Composition and config ────────────────────────────────────────────────────

#[cfg(test)]
mod composition {
    use std::sync::Arc;

    use pops_core::{Cell, Direction, SimRng};
    use pops_network::NetworkBuilder;

    use crate::{
        build_kernel, build_switch_kernel, DeterministicBranch, DeterministicKernel, DispersalKernel,
        Distribution, KernelConfig, KernelContext, KernelType, NaturalAnthropogenicKernel, Origin,
        RadialKernel, StochasticKernel, SwitchKernel,
    };

    fn ctx() -> KernelContext {
        KernelContext::new(20, 20, 1.0, 1.0)
    }

    #[test]
    fn stochastic_switch_replays_sub_kernel() {
        let dist = Distribution::weibull(1.5, 4.0).unwrap();
        let mut radial = RadialKernel::new(dist, 1.0, 1.0).unwrap();
        let window = DeterministicKernel::new(&dist, 0.9, 1.0, 1.0).unwrap();
        let mut switch = SwitchKernel::new(
            StochasticKernel::Radial(radial.clone()),
            Some(DeterministicBranch::Window(window)),
            false,
        );
        let mut ra = SimRng::new(77);
        let mut rb = SimRng::new(77);
        for _ in 0..500 {
            let o = Origin::new(8, 8);
            assert_eq!(switch.sample(&mut ra, o), radial.sample(&mut rb, o));
        }
    }

    #[test]
    fn deterministic_switch_uses_window() {
        let dist = Distribution::exponential(1.0).unwrap();
        let window = DeterministicKernel::new(&dist, 0.9, 1.0, 1.0).unwrap();
        let mut expected = window.clone();
        let mut switch = SwitchKernel::new(
            StochasticKernel::Radial(RadialKernel::new(dist, 1.0, 1.0).unwrap()),
            Some(DeterministicBranch::Window(window)),
            true,
        );
        assert!(switch.is_deterministic());
        let mut rng = SimRng::new(5);
        let o = Origin::new(4, 4).with_dispersers(3);
        for _ in 0..3 {
            assert_eq!(switch.sample(&mut rng, o), expected.sample(&mut rng, o));
        }
    }

    #[test]
    fn begin_day_reaches_nested_window() {
        let mut cfg = ctx();
        cfg.deterministic = true;
        cfg.dispersal_percentage = 0.9;
        let natural = KernelConfig::new(KernelType::Exponential, 1.0);
        let mut k = build_kernel(&natural, None, 1.0, &cfg).unwrap();
        let mut rng = SimRng::new(3);
        let o = Origin::new(5, 5).with_dispersers(1);
        let mut days = Vec::new();
        for _ in 0..4 {
            k.begin_day();
            days.push(k.sample(&mut rng, o));
        }
        assert_eq!(days, vec![(5, 5); 4]);
    }

    #[test]
    fn natural_only_mixture_replays_natural() {
        let cfg = KernelConfig::new(KernelType::Cauchy, 2.0);
        let natural = build_switch_kernel(&cfg, &ctx()).unwrap();
        let mut reference = natural.clone();
        let mut mix = NaturalAnthropogenicKernel::natural_only(natural);
        let mut ra = SimRng::new(11);
        let mut rb = SimRng::new(11);
        for _ in 0..300 {
            let o = Origin::new(10, 10);
            assert_eq!(mix.sample(&mut ra, o), reference.sample(&mut rb, o));
        }
    }

    #[test]
    fn anthropogenic_share_follows_percent_natural() {
        let natural = build_switch_kernel(
            &KernelConfig::new(KernelType::DeterministicNeighbor, 1.0).with_direction(Direction::N, 0.0),
            &ctx(),
        )
        .unwrap();
        let anthro = build_switch_kernel(
            &KernelConfig::new(KernelType::DeterministicNeighbor, 1.0).with_direction(Direction::S, 0.0),
            &ctx(),
        )
        .unwrap();
        let mut mix = NaturalAnthropogenicKernel::new(natural, Some(anthro), 0.75).unwrap();
        let mut rng = SimRng::new(8);
        let n = 4_000;
        let south = (0..n).filter(|_| mix.sample(&mut rng, Origin::new(5, 5)) == (6, 5)).count();
        let share = south as f64 / n as f64;
        assert!((share - 0.25).abs() < 0.03, "anthropogenic share {share}");
    }

    #[test]
    fn ineligible_anthropogenic_falls_back_to_natural() {
        let mut b = NetworkBuilder::new(1.0, 1.0);
        b.add_link(Cell::new(0, 0), Cell::new(0, 5), 1.0);
        let mut c = ctx();
        c.network = Some(Arc::new(b.build().unwrap()));
        c.network_min_distance = 5.0;
        c.network_max_distance = 10.0;
        let natural = KernelConfig::new(KernelType::DeterministicNeighbor, 1.0).with_direction(Direction::E, 0.0);
        let anthro = KernelConfig::new(KernelType::Network, 1.0);
        let mut mix = build_kernel(&natural, Some(&anthro), 0.0, &c).unwrap();
        let mut rng = SimRng::new(0);
        // (3, 3) has no network node.
        assert_eq!(mix.sample(&mut rng, Origin::new(3, 3)), (3, 4));
        assert_eq!(mix.sample(&mut rng, Origin::new(0, 0)), (0, 5));
    }

    #[test]
    fn build_switch_kernel_branches() {
        let mut c = ctx();
        c.deterministic = true;
        let exp = build_switch_kernel(&KernelConfig::new(KernelType::Exponential, 1.0), &c).unwrap();
        assert!(exp.is_deterministic());
        let uni = build_switch_kernel(&KernelConfig::new(KernelType::Uniform, 1.0), &c).unwrap();
        assert!(!uni.is_deterministic());
        let stoch = build_switch_kernel(&KernelConfig::new(KernelType::Exponential, 1.0), &ctx()).unwrap();
        assert!(!stoch.is_deterministic());
    }

    #[test]
    fn build_switch_kernel_errors() {
        assert!(build_switch_kernel(&KernelConfig::new(KernelType::DeterministicNeighbor, 1.0), &ctx()).is_err());
        assert!(build_switch_kernel(&KernelConfig::new(KernelType::Network, 1.0), &ctx()).is_err());
        assert!(build_switch_kernel(&KernelConfig::new(KernelType::Gamma, -2.0), &ctx()).is_err());
        let cfg = KernelConfig::new(KernelType::Normal, 1.0).with_direction(Direction::N, -0.5);
        assert!(build_switch_kernel(&cfg, &ctx()).is_err());
        let natural = KernelConfig::new(KernelType::Normal, 1.0);
        assert!(build_kernel(&natural, None, 1.5, &ctx()).is_err());
    }
}
