//! Unit tests for pops-core primitives.

#[cfg(test)]
mod grid {
    use proptest::prelude::*;

    use crate::{Cell, Grid, GridAccess, GridView, PopsError};

    #[test]
    fn new_fills_every_cell() {
        let g = Grid::new(2, 3, 7);
        assert_eq!(g.rows(), 2);
        assert_eq!(g.cols(), 3);
        assert!(g.iter().all(|&v| v == 7));
        assert_eq!(g.sum(), 42);
    }

    #[test]
    fn from_rows_is_row_major() {
        let g = Grid::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(g.as_slice(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(g[(1, 0)], 4);
        assert_eq!(g[Cell::new(0, 2)], 3);
    }

    #[test]
    fn ragged_rows_rejected() {
        assert!(Grid::from_rows(&[vec![1, 2], vec![3]]).is_err());
    }

    #[test]
    fn from_vec_checks_length() {
        let err = Grid::from_vec(2, 2, vec![0; 3]).unwrap_err();
        assert!(matches!(err, PopsError::BufferSize { rows: 2, cols: 2, got: 3 }));
    }

    #[test]
    fn get_outside_is_none() {
        let g = Grid::new(2, 2, 0);
        assert!(g.get(2, 0).is_none());
        assert!(g.get(0, 2).is_none());
        assert!(g.get(1, 1).is_some());
    }

    #[test]
    fn contains_signed() {
        let g = Grid::new(3, 4, 0u8);
        assert!(g.contains(0, 0));
        assert!(g.contains(2, 3));
        assert!(!g.contains(-1, 0));
        assert!(!g.contains(0, 4));
        assert!(!g.contains(3, 0));
    }

    #[test]
    #[should_panic]
    fn index_outside_panics() {
        let g = Grid::new(2, 2, 0);
        let _ = g[(0, 2)];
    }

    #[test]
    fn view_writes_through_to_caller_buffer() {
        let mut buf = vec![0i32; 6];
        {
            let mut view = GridView::new(2, 3, &mut buf).unwrap();
            view[(1, 2)] = 9;
            *view.get_mut(0, 1).unwrap() = 4;
            assert_eq!(view.to_grid()[(1, 2)], 9);
        }
        assert_eq!(buf, vec![0, 4, 0, 0, 0, 9]);
    }

    #[test]
    fn view_rejects_wrong_length() {
        let mut buf = vec![0i32; 5];
        assert!(GridView::new(2, 3, &mut buf).is_err());
    }

    #[test]
    fn view_copy_from_grid() {
        let mut buf = vec![0i32; 4];
        let src = Grid::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap();
        GridView::new(2, 2, &mut buf).unwrap().copy_from(&src).unwrap();
        assert_eq!(buf, vec![1, 2, 3, 4]);
    }

    #[test]
    fn iter_cells_row_major() {
        let g = Grid::new(2, 2, 0);
        let cells: Vec<Cell> = g.iter_cells().collect();
        assert_eq!(
            cells,
            vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)]
        );
    }

    #[test]
    fn map_keeps_shape() {
        let g = Grid::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap();
        let doubled = g.map(|v| f64::from(*v) * 2.0);
        assert!(doubled.same_shape(&g));
        assert_eq!(doubled[(1, 1)], 8.0);
    }

    proptest! {
        #[test]
        fn index_matches_buffer_offset(rows in 1usize..20, cols in 1usize..20, r in 0usize..20, c in 0usize..20) {
            prop_assume!(r < rows && c < cols);
            let data: Vec<usize> = (0..rows * cols).collect();
            let g = Grid::from_vec(rows, cols, data).unwrap();
            prop_assert_eq!(g[(r, c)], r * cols + c);
        }
    }
}

#[cfg(test)]
mod date {
    use crate::{Date, Season};

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::new(y, m, day).unwrap()
    }

    #[test]
    fn invalid_dates_rejected() {
        assert!(Date::new(2023, 2, 29).is_err());
        assert!(Date::new(2024, 13, 1).is_err());
        assert!(Date::new(2024, 2, 29).is_ok());
    }

    #[test]
    fn parse_and_display() {
        let date: Date = "2020-03-05".parse().unwrap();
        assert_eq!(date, d(2020, 3, 5));
        assert_eq!(date.to_string(), "2020-03-05");
        assert!("2020-3".parse::<Date>().is_err());
    }

    #[test]
    fn ordering() {
        assert!(d(2020, 1, 31) < d(2020, 2, 1));
        assert!(d(2021, 1, 1) > d(2020, 12, 31));
    }

    #[test]
    fn month_and_year_ends() {
        assert!(d(2020, 2, 29).is_last_day_of_month());
        assert!(!d(2021, 2, 27).is_last_day_of_month());
        assert!(d(2021, 2, 28).is_last_day_of_month());
        assert!(d(2019, 12, 31).is_last_day_of_year());
        assert!(!d(2019, 12, 30).is_last_day_of_year());
    }

    #[test]
    fn leap_years() {
        assert!(d(2000, 1, 1).is_leap_year());
        assert!(!d(1900, 1, 1).is_leap_year());
        assert!(d(2024, 6, 1).is_leap_year());
        assert!(!d(2023, 6, 1).is_leap_year());
    }

    #[test]
    fn day_arithmetic() {
        assert_eq!(d(2020, 2, 28).next_day(), Some(d(2020, 2, 29)));
        assert_eq!(d(2020, 12, 31).add_days(1), Some(d(2021, 1, 1)));
        assert_eq!(d(2020, 1, 1).days_until(d(2020, 3, 1)), 60);
        assert_eq!(d(2020, 3, 1).days_until(d(2020, 1, 1)), -60);
    }

    #[test]
    fn inclusive_range() {
        assert_eq!(Date::days_inclusive(d(2020, 1, 1), d(2020, 1, 1)), 1);
        assert_eq!(Date::days_inclusive(d(2020, 1, 1), d(2020, 12, 31)), 366);
        assert_eq!(Date::days_inclusive(d(2020, 1, 2), d(2020, 1, 1)), 0);
        let days: Vec<Date> = Date::iter_days(d(2020, 2, 27), d(2020, 3, 1)).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], d(2020, 2, 29));
        assert_eq!(Date::iter_days(d(2020, 2, 2), d(2020, 2, 1)).count(), 0);
    }

    #[test]
    fn season_plain_and_wrapping() {
        let summer = Season::new(6, 8).unwrap();
        assert!(summer.contains(d(2020, 7, 4)));
        assert!(!summer.contains(d(2020, 9, 1)));

        let winter = Season::new(11, 2).unwrap();
        assert!(winter.contains_month(12));
        assert!(winter.contains_month(1));
        assert!(!winter.contains_month(3));
        assert!(!winter.contains_month(10));
    }

    #[test]
    fn season_month_bounds() {
        assert!(Season::new(0, 5).is_err());
        assert!(Season::new(3, 13).is_err());
    }
}

#[cfg(test)]
mod direction {
    use crate::Direction;

    #[test]
    fn parse_accepts_none_spellings() {
        for s in ["NONE", "None", "none", ""] {
            assert_eq!(s.parse::<Direction>().unwrap(), Direction::None);
        }
        assert_eq!("NE".parse::<Direction>().unwrap(), Direction::NE);
        assert!("north".parse::<Direction>().is_err());
    }

    #[test]
    fn degrees_clockwise_from_north() {
        assert_eq!(Direction::N.degrees(), Some(0.0));
        assert_eq!(Direction::E.degrees(), Some(90.0));
        assert_eq!(Direction::NW.degrees(), Some(315.0));
        assert_eq!(Direction::None.degrees(), None);
    }

    #[test]
    fn offsets_use_south_growing_rows() {
        assert_eq!(Direction::N.offset(), Some((-1, 0)));
        assert_eq!(Direction::E.offset(), Some((0, 1)));
        assert_eq!(Direction::SW.offset(), Some((1, -1)));
        assert_eq!(Direction::None.offset(), None);
    }

    #[test]
    fn display_roundtrip() {
        for d in Direction::CLOCKWISE {
            assert_eq!(d.to_string().parse::<Direction>().unwrap(), d);
        }
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12345);
        let mut r2 = SimRng::new(12345);
        for _ in 0..100 {
            assert_eq!(r1.uniform(), r2.uniform());
        }
    }

    #[test]
    fn neighbouring_seeds_diverge() {
        let mut r0 = SimRng::new(1);
        let mut r1 = SimRng::new(2);
        let a: Vec<f64> = (0..4).map(|_| r0.uniform()).collect();
        let b: Vec<f64> = (0..4).map(|_| r1.uniform()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = SimRng::new(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
        assert!(rng.gen_bool(2.0));
    }

    #[test]
    fn poisson_zero_mean() {
        let mut rng = SimRng::new(3);
        assert_eq!(rng.poisson(0.0), 0);
        assert_eq!(rng.poisson(-1.0), 0);
        assert_eq!(rng.poisson(f64::NAN), 0);
    }

    #[test]
    fn poisson_mean_is_close() {
        let mut rng = SimRng::new(7);
        for lambda in [0.5, 4.0, 75.0] {
            let n = 4_000;
            let total: u64 = (0..n).map(|_| rng.poisson(lambda)).sum();
            let mean = total as f64 / n as f64;
            assert!((mean - lambda).abs() < lambda.sqrt() * 0.2 + 0.05, "lambda {lambda}: mean {mean}");
        }
    }

    #[test]
    fn binomial_bounds() {
        let mut rng = SimRng::new(9);
        assert_eq!(rng.binomial(10, 0.0), 0);
        assert_eq!(rng.binomial(10, 1.0), 10);
        for _ in 0..100 {
            assert!(rng.binomial(5, 0.5) <= 5);
        }
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = SimRng::new(11);
        for _ in 0..200 {
            assert_eq!(rng.weighted_index(&[0.0, 2.0, 0.0]), Some(1));
        }
        assert_eq!(rng.weighted_index(&[]), None);
        assert_eq!(rng.weighted_index(&[0.0, -1.0]), None);
    }
}
