//! Transport network representation and builder.
//!
//! # Data layout
//!
//! Nodes are grid cells.  They are stored sorted in row-major order, so a
//! node lookup is a binary search and iteration visits nodes in the same
//! order the engine visits cells.
//!
//! Outgoing edges use **Compressed Sparse Row (CSR)** format.  Given node
//! index `n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edges[ out_start[n] .. out_start[n+1] ]
//! ```
//!
//! Within one node, edges keep the order in which they were added, which
//! keeps the movement step deterministic.

use pops_core::{Cell, SimRng};

use crate::{NetworkError, NetworkResult};

// ── Edge ──────────────────────────────────────────────────────────────────────

/// A directed connection between two (usually non-adjacent) cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub to: Cell,
    /// Traversal probability for the movement step, and relative preference
    /// when walking the network.
    pub weight: f64,
    /// Travel cost in map units.
    pub length: f64,
    /// Maximum hosts moved along this edge per movement day.
    pub capacity: Option<u32>,
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Directed weighted graph over grid cells, in CSR format.
///
/// Do not construct directly; use [`NetworkBuilder`] or the CSV loader.
#[derive(Clone, Debug, Default)]
pub struct Network {
    /// Node cells, sorted row-major.
    nodes: Vec<Cell>,
    /// CSR row pointer.  Length = `nodes.len() + 1`.
    out_start: Vec<u32>,
    /// Edge data, grouped by source node.
    edges: Vec<Edge>,
    /// Source cell of each edge (parallel to `edges`).
    edge_from: Vec<Cell>,
}

impl Network {
    /// A network with no nodes.  Every lookup misses.
    pub fn empty() -> Self {
        Self { out_start: vec![0], ..Self::default() }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node cells in row-major order.
    pub fn nodes(&self) -> &[Cell] {
        &self.nodes
    }

    #[inline]
    fn node_index(&self, cell: Cell) -> Option<usize> {
        self.nodes.binary_search(&cell).ok()
    }

    /// `true` if some edge starts or ends at `cell`.
    #[inline]
    pub fn has_node_at(&self, cell: Cell) -> bool {
        self.node_index(cell).is_some()
    }

    /// Outgoing edges of `cell`.  Empty on a lookup miss.
    pub fn lookup(&self, cell: Cell) -> &[Edge] {
        match self.node_index(cell) {
            Some(n) => {
                let start = self.out_start[n] as usize;
                let end = self.out_start[n + 1] as usize;
                &self.edges[start..end]
            }
            None => &[],
        }
    }

    /// Iterate over every edge as `(from, edge)` in source-node order.
    pub fn iter_edges(&self) -> impl Iterator<Item = (Cell, &Edge)> + '_ {
        self.edge_from.iter().copied().zip(self.edges.iter())
    }

    /// Walk the network from `start` for up to `distance` map units.
    ///
    /// At each node an outgoing edge is picked with probability proportional
    /// to its weight.  The walk stops at the current node when it has no
    /// usable edge or when the picked edge is longer than the remaining
    /// distance.  A start cell without a node is returned unchanged.
    pub fn travel(&self, start: Cell, distance: f64, rng: &mut SimRng) -> Cell {
        if !distance.is_finite() {
            return start;
        }
        let mut here = start;
        let mut remaining = distance;
        let mut weights: Vec<f64> = Vec::new();
        loop {
            let edges = self.lookup(here);
            weights.clear();
            weights.extend(edges.iter().map(|e| e.weight));
            let Some(i) = rng.weighted_index(&weights) else {
                break;
            };
            let edge = &edges[i];
            if edge.length > remaining {
                break;
            }
            remaining -= edge.length;
            here = edge.to;
        }
        here
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct a [`Network`] incrementally, then call [`build`](Self::build).
///
/// Edges without an explicit length get the straight-line distance between
/// cell centres, scaled by the grid resolution.
///
/// # Example
///
/// ```
/// use pops_core::Cell;
/// use pops_network::NetworkBuilder;
///
/// let mut b = NetworkBuilder::new(30.0, 30.0);
/// b.add_link(Cell::new(0, 0), Cell::new(0, 4), 0.5);
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.lookup(Cell::new(0, 0))[0].length, 120.0);
/// ```
pub struct NetworkBuilder {
    ew_res:    f64,
    ns_res:    f64,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:     Cell,
    to:       Cell,
    weight:   f64,
    length:   Option<f64>,
    capacity: Option<u32>,
}

impl NetworkBuilder {
    /// `ew_res` / `ns_res` are the cell width and height in map units.
    pub fn new(ew_res: f64, ns_res: f64) -> Self {
        Self { ew_res, ns_res, raw_edges: Vec::new() }
    }

    /// Add a directed edge with every attribute spelled out.
    pub fn add_edge(
        &mut self,
        from:     Cell,
        to:       Cell,
        weight:   f64,
        length:   Option<f64>,
        capacity: Option<u32>,
    ) -> &mut Self {
        self.raw_edges.push(RawEdge { from, to, weight, length, capacity });
        self
    }

    /// Add a directed edge with a derived length and no capacity limit.
    pub fn add_link(&mut self, from: Cell, to: Cell, weight: f64) -> &mut Self {
        self.add_edge(from, to, weight, None, None)
    }

    /// Add edges in both directions with the same weight.
    pub fn add_two_way(&mut self, a: Cell, b: Cell, weight: f64) -> &mut Self {
        self.add_link(a, b, weight);
        self.add_link(b, a, weight)
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    fn centre_distance(&self, a: Cell, b: Cell) -> f64 {
        let dy = (a.row as f64 - b.row as f64) * self.ns_res;
        let dx = (a.col as f64 - b.col as f64) * self.ew_res;
        dx.hypot(dy)
    }

    /// Validate edges and produce a [`Network`].
    ///
    /// Weights must be finite and non-negative; lengths must be finite and
    /// positive; self-loops are rejected.
    pub fn build(self) -> NetworkResult<Network> {
        let mut resolved: Vec<(Cell, Edge)> = Vec::with_capacity(self.raw_edges.len());
        for raw in &self.raw_edges {
            let invalid = |reason: &str| NetworkError::InvalidEdge {
                from:   raw.from,
                to:     raw.to,
                reason: reason.to_owned(),
            };
            if raw.from == raw.to {
                return Err(invalid("self-loop"));
            }
            if !raw.weight.is_finite() || raw.weight < 0.0 {
                return Err(invalid("weight must be finite and non-negative"));
            }
            let length = raw.length.unwrap_or_else(|| self.centre_distance(raw.from, raw.to));
            if !length.is_finite() || length <= 0.0 {
                return Err(invalid("length must be finite and positive"));
            }
            resolved.push((raw.from, Edge {
                to: raw.to,
                weight: raw.weight,
                length,
                capacity: raw.capacity,
            }));
        }

        // Stable sort keeps insertion order among a node's edges.
        resolved.sort_by_key(|(from, _)| *from);

        let mut nodes: Vec<Cell> = resolved.iter().flat_map(|(from, e)| [*from, e.to]).collect();
        nodes.sort_unstable();
        nodes.dedup();

        let mut out_start = vec![0u32; nodes.len() + 1];
        for (from, _) in &resolved {
            // `from` was inserted into `nodes` above.
            if let Ok(n) = nodes.binary_search(from) {
                out_start[n + 1] += 1;
            }
        }
        for i in 1..=nodes.len() {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[nodes.len()] as usize, resolved.len());

        let (edge_from, edges): (Vec<Cell>, Vec<Edge>) = resolved.into_iter().unzip();
        Ok(Network { nodes, out_start, edges, edge_from })
    }
}
