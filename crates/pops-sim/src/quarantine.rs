//! Quarantine escape analysis.
//!
//! Quarantine areas are given as an integer grid: a positive value is an
//! area id, zero or a negative value is outside every area.  Each area is approximated by the bounding
//! box of its cells.

use std::collections::BTreeMap;

use pops_core::{Direction, Grid, GridAccess};

use crate::spread_rate::{infection_boundary, BBox};

/// Closest box edge to the infection within one area.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AreaDistance {
    pub area_id:   i32,
    /// Map units from the nearest infected cell to the box edge.
    pub distance:  f64,
    /// One of `N`, `S`, `E`, `W`.
    pub direction: Direction,
}

#[derive(Clone, PartialEq, Debug)]
pub enum QuarantineReport {
    /// Some infected cell lies outside every area.
    Escaped,
    /// All infection is inside areas; one entry per area holding infection,
    /// ordered by area id.
    Contained(Vec<AreaDistance>),
}

impl QuarantineReport {
    pub fn escaped(&self) -> bool {
        matches!(self, QuarantineReport::Escaped)
    }
}

#[derive(Clone, Debug)]
pub struct QuarantineAreas {
    areas:  Grid<i32>,
    boxes:  BTreeMap<i32, BBox>,
    ew_res: f64,
    ns_res: f64,
}

impl QuarantineAreas {
    pub fn new(areas: Grid<i32>, ew_res: f64, ns_res: f64) -> Self {
        let mut boxes: BTreeMap<i32, BBox> = BTreeMap::new();
        for c in areas.iter_cells() {
            let id = areas[c];
            if id <= 0 {
                continue;
            }
            boxes
                .entry(id)
                .and_modify(|b| {
                    b.north = b.north.min(c.row);
                    b.south = b.south.max(c.row);
                    b.east = b.east.max(c.col);
                    b.west = b.west.min(c.col);
                })
                .or_insert(BBox { north: c.row, south: c.row, east: c.col, west: c.col });
        }
        Self { areas, boxes, ew_res, ns_res }
    }

    pub fn rows(&self) -> usize {
        self.areas.rows()
    }

    pub fn cols(&self) -> usize {
        self.areas.cols()
    }

    /// Bounding box of area `id`.
    pub fn area_box(&self, id: i32) -> Option<BBox> {
        self.boxes.get(&id).copied()
    }

    pub fn area_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.boxes.keys().copied()
    }

    /// Whether the infection stays inside the areas, and how close it is to
    /// each area's edge.
    pub fn escape_report(&self, infected: &Grid<i32>) -> QuarantineReport {
        let mut nearest: BTreeMap<i32, AreaDistance> = BTreeMap::new();
        for c in infected.iter_cells().filter(|&c| infected[c] > 0) {
            let id = self.areas.get(c.row, c.col).copied().unwrap_or(0);
            let Some(bbox) = self.boxes.get(&id) else {
                return QuarantineReport::Escaped;
            };
            let (distance, direction) = self.closest_edge(c.row, c.col, bbox);
            let candidate = AreaDistance { area_id: id, distance, direction };
            nearest
                .entry(id)
                .and_modify(|best| {
                    if distance < best.distance {
                        *best = candidate;
                    }
                })
                .or_insert(candidate);
        }
        QuarantineReport::Contained(nearest.into_values().collect())
    }

    /// Bounding box of the current infection.
    pub fn infection_boundary(&self, infected: &Grid<i32>) -> Option<BBox> {
        infection_boundary(infected)
    }

    /// Ties go to the first of N, S, E, W.
    fn closest_edge(&self, row: usize, col: usize, b: &BBox) -> (f64, Direction) {
        let candidates = [
            ((row - b.north) as f64 * self.ns_res, Direction::N),
            ((b.south - row) as f64 * self.ns_res, Direction::S),
            ((b.east - col) as f64 * self.ew_res, Direction::E),
            ((col - b.west) as f64 * self.ew_res, Direction::W),
        ];
        candidates
            .into_iter()
            .fold((f64::INFINITY, Direction::N), |best, c| if c.0 < best.0 { c } else { best })
    }
}
