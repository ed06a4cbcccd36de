//! Network error type.

use thiserror::Error;

use pops_core::Cell;

/// Errors produced by `pops-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid edge {from} -> {to}: {reason}")]
    InvalidEdge { from: Cell, to: Cell, reason: String },

    #[error("network parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
