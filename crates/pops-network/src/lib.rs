//! `pops-network` — the long-distance transport network.
//!
//! Nodes are grid cells and edges are weighted, directed links between
//! (typically non-adjacent) cells.  The spread engine needs only two
//! queries:
//!
//! - `lookup(cell) -> &[Edge]` for the movement step, and
//! - `travel(cell, distance, rng) -> Cell` for the network dispersal kernel.
//!
//! # Crate layout
//!
//! | Module      | Contents                                               |
//! |-------------|--------------------------------------------------------|
//! | [`network`] | `Network` (CSR), `Edge`, `NetworkBuilder`              |
//! | [`loader`]  | `load_network_csv`, `load_network_reader`, `write_network_csv` |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                     |

pub mod error;
pub mod loader;
pub mod network;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use loader::{load_network_csv, load_network_reader, write_network_csv};
pub use network::{Edge, Network, NetworkBuilder};
