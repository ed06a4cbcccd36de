use thiserror::Error;

use pops_core::PopsError;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid frequency rule: {0}")]
    InvalidRule(String),

    #[error("schedule parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] PopsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
