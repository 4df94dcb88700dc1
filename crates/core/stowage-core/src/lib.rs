//! Stowage Core - Shared types
//!
//! This crate defines the output contract of the storage simulation, consumed by:
//! - stowage-simulation-engine (period engine and runner)
//! - any rendering or reporting layer reading the batch table
//!
//! Key types:
//! - Item and ItemId (opaque FIFO payloads)
//! - PeriodSnapshot, SimulationRun, SimulationBatch (occupancy tables)
//! - ConfigError (the only failure the core can raise)

pub mod types;
pub mod error;

pub use types::*;
pub use error::*;
