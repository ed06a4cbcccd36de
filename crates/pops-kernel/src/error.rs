//! Kernel error type.

use thiserror::Error;

use pops_core::PopsError;

/// Errors produced while building kernels.  Sampling never fails.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("{law}: parameter `{name}` is invalid ({value})")]
    InvalidParameter { law: &'static str, name: &'static str, value: f64 },

    #[error("kernel configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] PopsError),
}

pub type KernelResult<T> = Result<T, KernelError>;
