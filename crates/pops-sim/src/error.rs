use thiserror::Error;

use pops_core::{Cell, PopsError};
use pops_kernel::KernelError;
use pops_network::NetworkError;
use pops_schedule::ScheduleError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} is {got_rows}x{got_cols}, expected {rows}x{cols}")]
    ShapeMismatch {
        what:     &'static str,
        rows:     usize,
        cols:     usize,
        got_rows: usize,
        got_cols: usize,
    },

    #[error("{grid} at {cell} is negative ({value})")]
    InvariantViolation { grid: &'static str, cell: Cell, value: i64 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Core(#[from] PopsError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
