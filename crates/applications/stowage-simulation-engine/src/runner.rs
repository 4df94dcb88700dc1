//! Simulation runner
//!
//! Drives the period engine for `num_periods` periods per run and repeats this
//! for independent runs. Each run starts from empty areas and draws from its
//! own random stream, so runs can execute in any order, or concurrently,
//! without changing their results.

use std::sync::Arc;

use tracing::{debug, info};

use stowage_core::{PeriodSnapshot, RunTotals, SimulationBatch, SimulationRun};

use crate::config::SimulationConfig;
use crate::engine::PeriodEngine;
use crate::rng::{SimRng, entropy_seed, run_rng};

/// Runs and batches of runs over one engine configuration
#[derive(Clone)]
pub struct SimulationRunner {
    engine: Arc<PeriodEngine>,
    seed: u64,
}

impl SimulationRunner {
    /// Validate `config` and build a runner. Without a configured seed one is
    /// drawn from entropy and logged so the batch can be replayed.
    pub fn new(config: &SimulationConfig) -> stowage_core::Result<Self> {
        config.validate()?;
        let engine = PeriodEngine::from_config(config)?;
        let seed = config.seed.unwrap_or_else(entropy_seed);

        info!(
            seed,
            areas = engine.num_areas(),
            policy = engine.policy_name(),
            "Simulation runner ready"
        );

        Ok(Self::with_engine(engine, seed))
    }

    pub fn with_engine(engine: PeriodEngine, seed: u64) -> Self {
        SimulationRunner {
            engine: Arc::new(engine),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn engine(&self) -> &PeriodEngine {
        &self.engine
    }

    /// One run's occupancy time series (simulation 0)
    pub fn run_single(&self, num_periods: u64) -> Vec<PeriodSnapshot> {
        self.run(0, num_periods).snapshots
    }

    /// Run `simulation` on its own stream of the batch seed
    pub fn run(&self, simulation: usize, num_periods: u64) -> SimulationRun {
        let mut rng = run_rng(self.seed, simulation);
        self.run_with_rng(simulation, num_periods, &mut rng)
    }

    /// Run from fresh areas, drawing from `rng`
    pub fn run_with_rng(
        &self,
        simulation: usize,
        num_periods: u64,
        rng: &mut SimRng,
    ) -> SimulationRun {
        let mut areas = self.engine.fresh_areas();
        let mut snapshots = Vec::with_capacity(num_periods as usize);
        let mut totals = RunTotals {
            simulation,
            ..RunTotals::default()
        };

        for period in 0..num_periods {
            let outcome = self.engine.advance(&mut areas, period, rng);

            totals.stored += outcome.stored() as u64;
            totals.removed += outcome.removed() as u64;
            totals.dropped += outcome.dropped as u64;
            totals.unfulfilled += outcome.unfulfilled as u64;

            snapshots.push(outcome.snapshot);
        }

        debug!(
            simulation,
            periods = num_periods,
            stored = totals.stored,
            removed = totals.removed,
            dropped = totals.dropped,
            unfulfilled = totals.unfulfilled,
            "Run complete"
        );

        SimulationRun {
            simulation,
            snapshots,
            totals,
        }
    }

    /// Run `num_simulations` independent runs and concatenate them in index order
    pub fn run_batch(&self, num_simulations: usize, num_periods: u64) -> SimulationBatch {
        info!(num_simulations, num_periods, seed = self.seed, "Starting batch");

        let runs = (0..num_simulations).map(|simulation| self.run(simulation, num_periods));
        let batch = SimulationBatch::from_runs(self.engine.num_areas(), runs);

        info!(rows = batch.len(), "Batch complete");
        batch
    }

    /// Same as [`run_batch`](Self::run_batch), with runs executing concurrently
    /// on the blocking thread pool
    #[cfg(feature = "async")]
    pub async fn run_batch_async(
        &self,
        num_simulations: usize,
        num_periods: u64,
    ) -> crate::error::Result<SimulationBatch> {
        use crate::error::SimulationError;

        info!(num_simulations, num_periods, seed = self.seed, "Starting concurrent batch");

        let mut tasks = tokio::task::JoinSet::new();
        for simulation in 0..num_simulations {
            let runner = self.clone();
            tasks.spawn_blocking(move || runner.run(simulation, num_periods));
        }

        let mut runs = Vec::with_capacity(num_simulations);
        while let Some(joined) = tasks.join_next().await {
            runs.push(joined.map_err(|e| SimulationError::worker(e.to_string()))?);
        }
        runs.sort_by_key(|run| run.simulation);

        let batch = SimulationBatch::from_runs(self.engine.num_areas(), runs);
        info!(rows = batch.len(), "Concurrent batch complete");
        Ok(batch)
    }
}
