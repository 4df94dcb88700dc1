//! Error types for Stowage

use thiserror::Error;

use crate::types::AreaId;

/// Result type for configuration-checked operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration errors, raised before any period executes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Configuration error: at least one storage area is required")]
    NoAreas,

    #[error("Configuration error: storage area {area} has non-positive capacity {capacity}")]
    NonPositiveCapacity { area: AreaId, capacity: usize },

    #[error("Configuration error: {name} intensity must lie in [0, 4294967295], got {value}")]
    InvalidIntensity { name: &'static str, value: f64 },

    #[error("Configuration error: skip probability must lie in [0, 1], got {0}")]
    InvalidSkipProbability(f64),

    #[error("Configuration error: efficiency range must satisfy 0 < min <= max <= 1, got {min}..={max}")]
    InvalidEfficiencyRange { min: f64, max: f64 },

    #[error("Configuration error: throughput parameter `{0}` must be positive")]
    ZeroThroughput(&'static str),

    #[error("Configuration error: forklifts × items per trip × trips per period overflows")]
    ThroughputOverflow,
}
