//! Stowage Simulation Engine
//!
//! Discrete-time simulator of capacity-bounded FIFO storage areas under Poisson
//! arrival and departure load.

pub mod area;
pub mod config;
pub mod demand;
pub mod engine;
pub mod error;
pub mod policies;
pub mod rng;
pub mod runner;
pub mod summary;
pub mod types;
