//! Error types for the simulation engine.
//!
//! Configuration and export errors are fatal. [`LoanDenied`] is an ordinary
//! decision-time outcome that a person handles by skipping the loan.

use std::path::PathBuf;

/// Invalid construction-time parameters. Raised before any run starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("grid dimensions must be positive (got {width}x{height})")]
    InvalidGrid { width: u32, height: u32 },

    #[error("initial population must be at least one person")]
    EmptyPopulation,

    #[error("reserve percent must be within 0..=100 (got {0})")]
    ReservePercentOutOfRange(u32),

    #[error("{name} must be a probability within 0..=1 (got {value})")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("{name} must not be negative (got {value})")]
    NegativeAmount { name: &'static str, value: i64 },

    #[error("{name} must be positive (got {value})")]
    NonPositiveTrade { name: &'static str, value: i64 },

    #[error("wallet floor {floor} exceeds wallet target {target}")]
    InvertedWalletPolicy { floor: i64, target: i64 },

    #[error("{people} people with up to {per_person} each exceeds the representable money supply")]
    MoneyOverflow { people: usize, per_person: i64 },

    #[error("sweep axis `{0}` has no values")]
    EmptyAxis(&'static str),

    #[error("batch iterations must be at least one")]
    ZeroIterations,

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The bank could not cover a loan request without breaching its reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("loan of {requested} denied: only {lendable} lendable")]
pub struct LoanDenied {
    pub requested: i64,
    pub lendable: i64,
}

/// Failures while turning trajectories into tabular files.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{0} column is missing from the data.")]
    MissingColumn(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Umbrella error for running simulations and sweeps.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
