//! Unit tests for pops-network.

use pops_core::Cell;

use crate::{Network, NetworkBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Chain 0,0 → 0,3 → 0,6 with unit-resolution lengths of 3.
fn chain() -> Network {
    let mut b = NetworkBuilder::new(1.0, 1.0);
    b.add_link(Cell::new(0, 0), Cell::new(0, 3), 1.0);
    b.add_link(Cell::new(0, 3), Cell::new(0, 6), 1.0);
    b.build().unwrap()
}

// ── Network ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod network {
    use pops_core::{Cell, SimRng};

    use super::chain;
    use crate::{Network, NetworkBuilder};

    #[test]
    fn empty_network_misses() {
        let net = Network::empty();
        assert!(net.is_empty());
        assert!(net.lookup(Cell::new(0, 0)).is_empty());
        assert!(!net.has_node_at(Cell::new(0, 0)));
    }

    #[test]
    fn nodes_include_edge_targets() {
        let net = chain();
        assert_eq!(net.node_count(), 3);
        assert!(net.has_node_at(Cell::new(0, 6)));
        assert!(net.lookup(Cell::new(0, 6)).is_empty());
    }

    #[test]
    fn nodes_sorted_row_major() {
        let mut b = NetworkBuilder::new(1.0, 1.0);
        b.add_link(Cell::new(4, 0), Cell::new(1, 5), 1.0);
        b.add_link(Cell::new(1, 2), Cell::new(4, 0), 1.0);
        let net = b.build().unwrap();
        assert_eq!(net.nodes(), &[Cell::new(1, 2), Cell::new(1, 5), Cell::new(4, 0)]);
    }

    #[test]
    fn lookup_keeps_insertion_order() {
        let mut b = NetworkBuilder::new(1.0, 1.0);
        let hub = Cell::new(2, 2);
        b.add_link(hub, Cell::new(9, 9), 0.2);
        b.add_link(Cell::new(0, 0), hub, 0.1);
        b.add_link(hub, Cell::new(0, 5), 0.3);
        let net = b.build().unwrap();
        let targets: Vec<Cell> = net.lookup(hub).iter().map(|e| e.to).collect();
        assert_eq!(targets, vec![Cell::new(9, 9), Cell::new(0, 5)]);
        assert_eq!(net.edge_count(), 3);
    }

    #[test]
    fn derived_length_uses_resolution() {
        let mut b = NetworkBuilder::new(30.0, 10.0);
        b.add_link(Cell::new(0, 0), Cell::new(3, 4), 1.0);
        let net = b.build().unwrap();
        let len = net.lookup(Cell::new(0, 0))[0].length;
        assert!((len - (120.0f64.powi(2) + 30.0f64.powi(2)).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn invalid_edges_rejected() {
        let mut b = NetworkBuilder::new(1.0, 1.0);
        b.add_link(Cell::new(0, 0), Cell::new(0, 0), 1.0);
        assert!(b.build().is_err());

        let mut b = NetworkBuilder::new(1.0, 1.0);
        b.add_link(Cell::new(0, 0), Cell::new(0, 1), -0.5);
        assert!(b.build().is_err());

        let mut b = NetworkBuilder::new(1.0, 1.0);
        b.add_edge(Cell::new(0, 0), Cell::new(0, 1), 1.0, Some(0.0), None);
        assert!(b.build().is_err());
    }

    #[test]
    fn travel_stops_when_distance_runs_out() {
        let net = chain();
        let mut rng = SimRng::new(1);
        assert_eq!(net.travel(Cell::new(0, 0), 2.0, &mut rng), Cell::new(0, 0));
        assert_eq!(net.travel(Cell::new(0, 0), 3.0, &mut rng), Cell::new(0, 3));
        assert_eq!(net.travel(Cell::new(0, 0), 5.9, &mut rng), Cell::new(0, 3));
        assert_eq!(net.travel(Cell::new(0, 0), 100.0, &mut rng), Cell::new(0, 6));
    }

    #[test]
    fn travel_from_non_node_stays_put() {
        let net = chain();
        let mut rng = SimRng::new(1);
        assert_eq!(net.travel(Cell::new(7, 7), 10.0, &mut rng), Cell::new(7, 7));
        assert_eq!(net.travel(Cell::new(0, 0), f64::INFINITY, &mut rng), Cell::new(0, 0));
    }

    #[test]
    fn travel_ignores_zero_weight_edges() {
        let mut b = NetworkBuilder::new(1.0, 1.0);
        b.add_link(Cell::new(0, 0), Cell::new(0, 1), 0.0);
        b.add_link(Cell::new(0, 0), Cell::new(1, 0), 1.0);
        let net = b.build().unwrap();
        let mut rng = SimRng::new(5);
        for _ in 0..50 {
            assert_eq!(net.travel(Cell::new(0, 0), 1.0, &mut rng), Cell::new(1, 0));
        }
    }
}

// ── CSV Loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::{Cursor, Write};

    use pops_core::Cell;

    use super::chain;
    use crate::{load_network_csv, load_network_reader, write_network_csv};

    const CSV: &[u8] = b"\
from_row,from_col,to_row,to_col,weight,length,capacity\n\
0,0,5,9,0.10,,\n\
5,9,0,0,0.05,400.0,20\n\
";

    #[test]
    fn loads_optional_columns() {
        let net = load_network_reader(Cursor::new(CSV), 10.0, 10.0).unwrap();
        assert_eq!(net.edge_count(), 2);
        let out = &net.lookup(Cell::new(0, 0))[0];
        assert_eq!(out.to, Cell::new(5, 9));
        assert_eq!(out.capacity, None);
        assert!((out.length - (90.0f64.powi(2) + 50.0f64.powi(2)).sqrt()).abs() < 1e-9);
        let back = &net.lookup(Cell::new(5, 9))[0];
        assert_eq!(back.length, 400.0);
        assert_eq!(back.capacity, Some(20));
    }

    #[test]
    fn header_without_optional_columns() {
        let csv = b"from_row,from_col,to_row,to_col,weight\n1,1,2,2,0.5\n";
        let net = load_network_reader(Cursor::new(csv.as_slice()), 1.0, 1.0).unwrap();
        assert_eq!(net.lookup(Cell::new(1, 1)).len(), 1);
    }

    #[test]
    fn malformed_row_errors() {
        let csv = b"from_row,from_col,to_row,to_col,weight\n1,x,2,2,0.5\n";
        assert!(load_network_reader(Cursor::new(csv.as_slice()), 1.0, 1.0).is_err());
    }

    #[test]
    fn write_then_reload_preserves_edges() {
        let net = chain();
        let mut buf = Vec::new();
        write_network_csv(&net, &mut buf).unwrap();
        let reloaded = load_network_reader(Cursor::new(buf), 99.0, 99.0).unwrap();
        assert_eq!(reloaded.nodes(), net.nodes());
        let a: Vec<_> = net.iter_edges().map(|(f, e)| (f, e.clone())).collect();
        let b: Vec<_> = reloaded.iter_edges().map(|(f, e)| (f, e.clone())).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV).unwrap();
        let net = load_network_csv(file.path(), 1.0, 1.0).unwrap();
        assert_eq!(net.node_count(), 2);
    }
}
