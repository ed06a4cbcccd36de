//! Host movement: along the transport network and from a dated list.
//!
//! # CSV format for scheduled movements
//!
//! ```text
//! date,row_from,col_from,row_to,col_to,count
//! 2020-03-01,4,10,90,12,25
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use pops_core::{Cell, Date, GridAccess, SimRng};
use pops_network::Network;

use crate::{HostPool, SimError, SimResult};

/// A dated transfer of hosts between two cells.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ScheduledMovement {
    pub date:  Date,
    pub from:  Cell,
    pub to:    Cell,
    pub count: u32,
}

// ── CSV loading ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MovementRecord {
    date:     String,
    row_from: usize,
    col_from: usize,
    row_to:   usize,
    col_to:   usize,
    count:    u32,
}

pub fn load_movements_csv(path: impl AsRef<Path>) -> SimResult<Vec<ScheduledMovement>> {
    let file = File::open(path)?;
    load_movements_reader(file)
}

/// Parse scheduled movements from any reader, sorted by date (stable).
pub fn load_movements_reader<R: Read>(reader: R) -> SimResult<Vec<ScheduledMovement>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for result in csv_reader.deserialize::<MovementRecord>() {
        let rec = result.map_err(|e| SimError::Parse(e.to_string()))?;
        let date: Date = rec.date.parse()?;
        out.push(ScheduledMovement {
            date,
            from: Cell::new(rec.row_from, rec.col_from),
            to: Cell::new(rec.row_to, rec.col_to),
            count: rec.count,
        });
    }
    out.sort_by_key(|m| m.date);
    Ok(out)
}

// ── Moving hosts ──────────────────────────────────────────────────────────────

/// Move up to `n` hosts (susceptible and infected) from `from` to `to`.
///
/// The susceptible/infected split is drawn without replacement when
/// `stochastic`, otherwise it is proportional with infected rounded.
/// Infected movers carry their mortality cohorts.  Returns hosts moved.
pub(crate) fn move_hosts(
    hosts:      &mut HostPool,
    from:       Cell,
    to:         Cell,
    n:          u64,
    stochastic: bool,
    rng:        &mut SimRng,
) -> u64 {
    let s = hosts.susceptible[from].max(0) as u64;
    let i = hosts.infected[from].max(0) as u64;
    let n = n.min(s + i);
    if n == 0 || from == to {
        return 0;
    }
    let infected_moved = if stochastic {
        let (mut s_left, mut i_left, mut picked) = (s, i, 0u64);
        for _ in 0..n {
            if rng.gen_range(0..s_left + i_left) < i_left {
                i_left -= 1;
                picked += 1;
            } else {
                s_left -= 1;
            }
        }
        picked
    } else {
        ((n as f64 * i as f64 / (s + i) as f64).round() as u64).min(i).max(n.saturating_sub(s))
    };
    let susceptible_moved = n - infected_moved;

    hosts.susceptible[from] -= susceptible_moved as i32;
    hosts.susceptible[to] += susceptible_moved as i32;
    let by_cohort = hosts.take_infected(from, infected_moved as i32);
    hosts.put_infected(to, &by_cohort);
    n
}

/// One movement day over the whole network.  Returns hosts moved.
pub(crate) fn move_along_network(
    hosts:      &mut HostPool,
    network:    &Network,
    stochastic: bool,
    rng:        &mut SimRng,
) -> u64 {
    let mut moved = 0;
    for &node in network.nodes() {
        if !hosts.susceptible.contains(node.row as i64, node.col as i64) {
            continue;
        }
        let edges = network.lookup(node);
        if edges.is_empty() {
            continue;
        }
        let origin_total = (hosts.susceptible[node] + hosts.infected[node]).max(0) as u64;
        let mut remaining = origin_total;
        for edge in edges {
            if remaining == 0 {
                break;
            }
            if !hosts.susceptible.contains(edge.to.row as i64, edge.to.col as i64) {
                continue;
            }
            let mut n = if stochastic {
                rng.binomial(remaining, edge.weight)
            } else {
                (edge.weight * origin_total as f64).round() as u64
            };
            if let Some(cap) = edge.capacity {
                n = n.min(cap as u64);
            }
            n = n.min(remaining);
            let done = move_hosts(hosts, node, edge.to, n, stochastic, rng);
            remaining -= done;
            moved += done;
        }
    }
    moved
}

/// Apply the scheduled movements dated `date`.  Returns hosts moved.
pub(crate) fn apply_scheduled(
    hosts:      &mut HostPool,
    movements:  &[ScheduledMovement],
    date:       Date,
    stochastic: bool,
    rng:        &mut SimRng,
) -> u64 {
    let mut moved = 0;
    for m in movements.iter().filter(|m| m.date == date) {
        let inside = |c: Cell| hosts.susceptible.contains(c.row as i64, c.col as i64);
        if !inside(m.from) || !inside(m.to) {
            warn!(%date, from = %m.from, to = %m.to, "scheduled movement outside the grid skipped");
            continue;
        }
        moved += move_hosts(hosts, m.from, m.to, m.count as u64, stochastic, rng);
    }
    moved
}
