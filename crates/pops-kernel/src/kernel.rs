//! The `DispersalKernel` trait and the kernel type catalogue.

use std::fmt;
use std::str::FromStr;

use pops_core::SimRng;

use crate::KernelError;

// ── Origin ────────────────────────────────────────────────────────────────────

/// Source cell of a disperser.
///
/// `dispersers` is the number of dispersers leaving this cell on the current
/// day.  Only the deterministic window kernel reads it; it splits the
/// window's probability mass evenly among them.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Origin {
    pub row:        i64,
    pub col:        i64,
    pub dispersers: u64,
}

impl Origin {
    #[inline]
    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col, dispersers: 1 }
    }

    #[inline]
    pub fn with_dispersers(mut self, dispersers: u64) -> Self {
        self.dispersers = dispersers;
        self
    }
}

// ── DispersalKernel ───────────────────────────────────────────────────────────

/// Samples a destination cell for one disperser.
///
/// The returned coordinate may lie outside the grid; the engine decides what
/// happens to such dispersers.  Implementations never fail at call time: all
/// parameter checks happen when the kernel is built.
///
/// Kernels take `&mut self` because some of them (the deterministic window
/// kernel) consume per-origin state between calls.
pub trait DispersalKernel {
    fn sample(&mut self, rng: &mut SimRng, origin: Origin) -> (i64, i64);

    /// `false` if this kernel cannot disperse from `(row, col)`.
    ///
    /// Default: every cell is eligible.
    fn is_cell_eligible(&self, _row: i64, _col: i64) -> bool {
        true
    }

    /// Called once at the start of every spread day, before any sample.
    ///
    /// Kernels that keep per-origin state drop it here.  Default: nothing.
    fn begin_day(&mut self) {}
}

// ── KernelType ────────────────────────────────────────────────────────────────

/// Named kernel families accepted in configuration.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KernelType {
    Cauchy,
    Exponential,
    ExponentialPower,
    Gamma,
    HyperbolicSecant,
    Logistic,
    LogNormal,
    Normal,
    PowerLaw,
    Weibull,
    Uniform,
    DeterministicNeighbor,
    Network,
}

impl KernelType {
    pub const ALL: [KernelType; 13] = [
        KernelType::Cauchy,
        KernelType::Exponential,
        KernelType::ExponentialPower,
        KernelType::Gamma,
        KernelType::HyperbolicSecant,
        KernelType::Logistic,
        KernelType::LogNormal,
        KernelType::Normal,
        KernelType::PowerLaw,
        KernelType::Weibull,
        KernelType::Uniform,
        KernelType::DeterministicNeighbor,
        KernelType::Network,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KernelType::Cauchy => "cauchy",
            KernelType::Exponential => "exponential",
            KernelType::ExponentialPower => "exponential-power",
            KernelType::Gamma => "gamma",
            KernelType::HyperbolicSecant => "hyperbolic-secant",
            KernelType::Logistic => "logistic",
            KernelType::LogNormal => "log-normal",
            KernelType::Normal => "normal",
            KernelType::PowerLaw => "power-law",
            KernelType::Weibull => "weibull",
            KernelType::Uniform => "uniform",
            KernelType::DeterministicNeighbor => "deterministic-neighbor",
            KernelType::Network => "network",
        }
    }

    /// `true` for the laws backed by a [`Distribution`](crate::Distribution).
    pub fn is_distance_law(self) -> bool {
        !matches!(self, KernelType::Uniform | KernelType::DeterministicNeighbor | KernelType::Network)
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KernelType {
    type Err = KernelError;

    /// Case-insensitive; `_` and `-` are interchangeable
    /// (`"log_normal"`, `"Log-Normal"` and `"log-normal"` are the same).
    fn from_str(s: &str) -> Result<Self, KernelError> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        KernelType::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| KernelError::Config(format!("unknown kernel type {s:?}")))
    }
}

impl TryFrom<String> for KernelType {
    type Error = KernelError;
    fn try_from(s: String) -> Result<Self, KernelError> {
        s.parse()
    }
}

impl From<KernelType> for String {
    fn from(k: KernelType) -> String {
        k.as_str().to_owned()
    }
}
