//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `PopsError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// The error type for `pops-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum PopsError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("grid buffer holds {got} cells, expected {rows}x{cols}")]
    BufferSize { rows: usize, cols: usize, got: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `pops-*` crates.
pub type PopsResult<T> = Result<T, PopsError>;
