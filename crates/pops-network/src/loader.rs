//! CSV network loader and writer.
//!
//! # CSV format
//!
//! One row per directed edge.  `length` and `capacity` may be left empty or
//! omitted from the header entirely.
//!
//! ```csv
//! from_row,from_col,to_row,to_col,weight,length,capacity
//! 0,0,5,9,0.10,,
//! 5,9,0,0,0.05,400.0,20
//! ```
//!
//! | Column     | Meaning                                                  |
//! |------------|----------------------------------------------------------|
//! | `weight`   | traversal probability / walk preference (≥ 0)            |
//! | `length`   | travel cost in map units; default = centre distance      |
//! | `capacity` | max hosts moved along the edge per movement day          |

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use pops_core::Cell;

use crate::{Network, NetworkBuilder, NetworkError};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Serialize)]
struct EdgeRecord {
    from_row: usize,
    from_col: usize,
    to_row:   usize,
    to_col:   usize,
    weight:   f64,
    #[serde(default)]
    length:   Option<f64>,
    #[serde(default)]
    capacity: Option<u32>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a network from a CSV file.
///
/// `ew_res` / `ns_res` are used for edges without an explicit length.
pub fn load_network_csv(path: &Path, ew_res: f64, ns_res: f64) -> Result<Network, NetworkError> {
    let file = std::fs::File::open(path).map_err(NetworkError::Io)?;
    load_network_reader(file, ew_res, ns_res)
}

/// Like [`load_network_csv`] but accepts any `Read` source.
pub fn load_network_reader<R: Read>(
    reader: R,
    ew_res: f64,
    ns_res: f64,
) -> Result<Network, NetworkError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut builder = NetworkBuilder::new(ew_res, ns_res);
    for result in csv_reader.deserialize::<EdgeRecord>() {
        let row = result.map_err(|e| NetworkError::Parse(e.to_string()))?;
        builder.add_edge(
            Cell::new(row.from_row, row.from_col),
            Cell::new(row.to_row, row.to_col),
            row.weight,
            row.length,
            row.capacity,
        );
    }
    builder.build()
}

/// Write `network` in the format read by [`load_network_reader`].
///
/// Lengths are always written explicitly, so the output reloads to the same
/// graph regardless of resolution.
pub fn write_network_csv<W: Write>(network: &Network, writer: W) -> Result<(), NetworkError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (from, edge) in network.iter_edges() {
        csv_writer
            .serialize(EdgeRecord {
                from_row: from.row,
                from_col: from.col,
                to_row:   edge.to.row,
                to_col:   edge.to.col,
                weight:   edge.weight,
                length:   Some(edge.length),
                capacity: edge.capacity,
            })
            .map_err(|e| NetworkError::Parse(e.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}
