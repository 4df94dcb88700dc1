//! Cross-run aggregation of a batch
//!
//! For every period and area: mean, min and max occupancy over all runs, and
//! the fraction of runs in which the area was at capacity. Batch-wide item
//! flow totals come from the per-run totals.

use std::collections::BTreeMap;

use serde::Serialize;

use stowage_core::SimulationBatch;

/// Occupancy statistics of one area in one period, across runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OccupancyStats {
    pub mean: f64,
    pub min: usize,
    pub max: usize,
    /// Share of runs with the area full
    pub saturated_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: u64,
    /// Indexed by area position
    pub areas: Vec<OccupancyStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub num_simulations: usize,
    pub periods: Vec<PeriodSummary>,
    pub stored: u64,
    pub removed: u64,
    pub dropped: u64,
    pub unfulfilled: u64,
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: u64,
    samples: usize,
    min: usize,
    max: usize,
    saturated: usize,
}

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator {
            sum: 0,
            samples: 0,
            min: usize::MAX,
            max: 0,
            saturated: 0,
        }
    }
}

impl Accumulator {
    fn push(&mut self, occupancy: usize, capacity: Option<usize>) {
        self.sum += occupancy as u64;
        self.samples += 1;
        self.min = self.min.min(occupancy);
        self.max = self.max.max(occupancy);
        if capacity.is_some_and(|capacity| occupancy >= capacity) {
            self.saturated += 1;
        }
    }

    fn finish(&self) -> OccupancyStats {
        if self.samples == 0 {
            return OccupancyStats {
                mean: 0.0,
                min: 0,
                max: 0,
                saturated_fraction: 0.0,
            };
        }

        let samples = self.samples as f64;
        OccupancyStats {
            mean: self.sum as f64 / samples,
            min: self.min,
            max: self.max,
            saturated_fraction: self.saturated as f64 / samples,
        }
    }
}

impl BatchSummary {
    /// Summarize `batch`; `capacities` are the per-area capacities it ran with
    pub fn from_batch(batch: &SimulationBatch, capacities: &[usize]) -> Self {
        let num_areas = batch.num_areas();
        let mut by_period: BTreeMap<u64, Vec<Accumulator>> = BTreeMap::new();

        for row in batch.rows() {
            let accumulators = by_period
                .entry(row.snapshot.period)
                .or_insert_with(|| vec![Accumulator::default(); num_areas]);

            for (index, &occupancy) in row.snapshot.occupancy.iter().enumerate() {
                if let Some(accumulator) = accumulators.get_mut(index) {
                    accumulator.push(occupancy, capacities.get(index).copied());
                }
            }
        }

        let periods = by_period
            .into_iter()
            .map(|(period, accumulators)| PeriodSummary {
                period,
                areas: accumulators.iter().map(Accumulator::finish).collect(),
            })
            .collect();

        let totals = batch.totals();
        BatchSummary {
            num_simulations: batch.num_simulations(),
            periods,
            stored: totals.iter().map(|t| t.stored).sum(),
            removed: totals.iter().map(|t| t.removed).sum(),
            dropped: totals.iter().map(|t| t.dropped).sum(),
            unfulfilled: totals.iter().map(|t| t.unfulfilled).sum(),
        }
    }

    pub fn final_period(&self) -> Option<&PeriodSummary> {
        self.periods.last()
    }
}
