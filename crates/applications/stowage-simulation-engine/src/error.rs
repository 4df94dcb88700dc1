//! Error types for the simulation engine

use stowage_core::ConfigError;
use thiserror::Error;

/// Engine result type
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors that can abort a run or batch
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Invalid configuration, detected before any period runs
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A concurrent run did not complete
    #[error("Simulation worker failed: {0}")]
    Worker(String),
}

impl SimulationError {
    /// Create a worker error
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }
}
