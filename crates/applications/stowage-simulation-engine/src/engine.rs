//! Period engine: advances one run by one discrete time step
//!
//! Each period, in order:
//! 1. Draw departure demand D, then arrival demand A, from the run's stream
//! 2. Make D removal attempts through the departure policy (ascending id, FIFO)
//! 3. Make A storage attempts, each into the lowest-id area with free capacity
//! 4. Report occupancy per area
//!
//! Saturation (arrivals dropped) and starvation (departures with nothing to
//! remove) are ordinary outcomes, reported as counts rather than errors.

use tracing::trace;

use stowage_core::{AreaId, Item, PeriodSnapshot, Result};

use crate::area::StorageArea;
use crate::config::{SimulationConfig, validate_capacities};
use crate::demand::DemandModel;
use crate::policies::DeparturePolicy;
use crate::rng::SimRng;
use crate::types::{AreaFlow, Demand, PeriodOutcome};

/// Immutable per-period rules shared by every run of a batch
pub struct PeriodEngine {
    capacities: Vec<usize>,
    arrivals: DemandModel,
    departures: DemandModel,
    policy: Box<dyn DeparturePolicy>,
}

impl PeriodEngine {
    /// Create an engine, failing fast on an invalid area layout
    pub fn new(
        capacities: Vec<usize>,
        arrivals: DemandModel,
        departures: DemandModel,
        policy: Box<dyn DeparturePolicy>,
    ) -> Result<Self> {
        validate_capacities(&capacities)?;

        Ok(PeriodEngine {
            capacities,
            arrivals,
            departures,
            policy,
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        Self::new(
            config.capacities.clone(),
            DemandModel::from_config("arrival", &config.arrivals)?,
            DemandModel::from_config("departure", &config.departures)?,
            config.departure_policy.build()?,
        )
    }

    pub fn capacities(&self) -> &[usize] {
        &self.capacities
    }

    pub fn num_areas(&self) -> usize {
        self.capacities.len()
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Empty areas for the start of a run, ordered by id
    pub fn fresh_areas(&self) -> Vec<StorageArea> {
        self.capacities
            .iter()
            .enumerate()
            .map(|(index, &capacity)| StorageArea::new(AreaId::from_index(index), capacity))
            .collect()
    }

    /// Draw this period's demand: departures first, then arrivals
    pub fn draw_demand(&self, period: u64, rng: &mut SimRng) -> Demand {
        let departures = self.departures.sample(period, rng);
        let arrivals = self.arrivals.sample(period, rng);
        Demand::new(arrivals, departures)
    }

    /// Advance `areas` (as built by [`fresh_areas`](Self::fresh_areas)) by one period
    pub fn advance(
        &self,
        areas: &mut [StorageArea],
        period: u64,
        rng: &mut SimRng,
    ) -> PeriodOutcome {
        let demand = self.draw_demand(period, rng);
        self.apply(areas, period, demand, rng)
    }

    /// Apply already-drawn demand: departures, then arrivals, then the snapshot.
    ///
    /// Flows and the snapshot follow the slice order of `areas`, whatever their ids.
    pub fn apply(
        &self,
        areas: &mut [StorageArea],
        period: u64,
        demand: Demand,
        rng: &mut SimRng,
    ) -> PeriodOutcome {
        let before: Vec<usize> = areas.iter().map(StorageArea::occupancy).collect();
        let mut departed = Vec::new();

        let unfulfilled = self
            .policy
            .release(areas, demand.departures, rng, &mut departed);
        let mut flows: Vec<AreaFlow> = areas
            .iter()
            .zip(before)
            .map(|(area, held)| AreaFlow {
                stored: 0,
                removed: held - area.occupancy(),
            })
            .collect();

        let dropped = sequential_fill(areas, period, demand.arrivals, &mut flows);

        let snapshot = PeriodSnapshot::new(
            period,
            areas.iter().map(StorageArea::occupancy).collect(),
        );

        trace!(
            period,
            arrivals = demand.arrivals,
            departures = demand.departures,
            dropped,
            unfulfilled,
            occupancy = ?snapshot.occupancy,
            "period complete"
        );

        PeriodOutcome {
            snapshot,
            demand,
            flows,
            dropped,
            unfulfilled,
            departed,
        }
    }
}

/// Store `demand` new items, each into the lowest-id area with free capacity.
///
/// Returns the number of arrivals dropped because every area was full.
pub fn sequential_fill(
    areas: &mut [StorageArea],
    period: u64,
    demand: u32,
    flows: &mut [AreaFlow],
) -> u32 {
    // Areas only fill during this phase, so the scan resumes where it stopped
    let mut first_open = 0;

    for sequence in 0..demand {
        while first_open < areas.len() && areas[first_open].is_full() {
            first_open += 1;
        }
        if first_open == areas.len() {
            return demand - sequence;
        }

        if areas[first_open].store(Item::new(period, sequence)).is_ok() {
            flows[first_open].stored += 1;
        }
    }
    0
}
