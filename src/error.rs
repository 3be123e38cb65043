//! Error types for the Monte Carlo engine

use thiserror::Error;

/// Errors surfaced by configuration, initialization, and the sampling loop
#[derive(Error, Debug)]
pub enum McError {
    /// Energy model token not registered with the factory
    #[error("Unknown energy model: {0} (expected one of LJ, Buckingham, UnitlessLJ)")]
    UnknownModel(String),

    /// Invalid simulation parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A trial move produced a non-finite particle energy
    #[error("Non-finite energy {energy} for particle {particle} at step {step}")]
    NumericFault {
        step: usize,
        particle: usize,
        energy: f64,
    },

    /// The initial configuration has a non-finite total pair energy
    #[error("Non-finite initial pair energy: {0}")]
    NonFiniteInitialEnergy(f64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

pub type Result<T> = std::result::Result<T, McError>;
