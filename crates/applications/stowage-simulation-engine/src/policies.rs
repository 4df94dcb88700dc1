//! Departure policies
//!
//! Both policies scan areas in ascending id order and release the oldest item of
//! the first eligible area, one item per attempt:
//! - SimpleFifo: any non-empty area is eligible
//! - EfficiencyPerturbed: per area and per period, the area may be skipped
//!   outright, and otherwise may release at most a throughput cap scaled by a
//!   randomly drawn processing efficiency

use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use tracing::trace;

use stowage_core::{ConfigError, Result};

use crate::area::StorageArea;
use crate::rng::SimRng;
use crate::types::Departure;

/// Departure policy trait
pub trait DeparturePolicy: Send + Sync {
    /// Make `demand` removal attempts against `areas`, appending released items
    /// to `departed` in removal order.
    ///
    /// Returns the number of attempts that found no eligible area.
    fn release(
        &self,
        areas: &mut [StorageArea],
        demand: u32,
        rng: &mut SimRng,
        departed: &mut Vec<Departure>,
    ) -> u32;

    /// Get policy name
    fn name(&self) -> &str;
}

/// Base rule: drain the lowest-id non-empty area first
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFifoPolicy;

impl SimpleFifoPolicy {
    pub fn new() -> Self {
        SimpleFifoPolicy
    }
}

impl DeparturePolicy for SimpleFifoPolicy {
    fn release(
        &self,
        areas: &mut [StorageArea],
        demand: u32,
        _rng: &mut SimRng,
        departed: &mut Vec<Departure>,
    ) -> u32 {
        for attempt in 0..demand {
            let Some(area) = areas.iter_mut().find(|area| !area.is_empty()) else {
                // Everything is empty; the rest of the demand goes unmet
                return demand - attempt;
            };
            if let Some(item) = area.release() {
                departed.push(Departure {
                    area: area.id(),
                    item,
                });
            }
        }
        0
    }

    fn name(&self) -> &str {
        "SimpleFifo"
    }
}

/// Parameters of the efficiency-perturbed departure policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyParams {
    /// Probability that an area is not serviced at all in a period
    pub skip_probability: f64,
    pub min_efficiency: f64,
    pub max_efficiency: f64,
    pub forklifts: u32,
    pub items_per_trip: u32,
    pub trips_per_period: u32,
}

impl Default for EfficiencyParams {
    fn default() -> Self {
        EfficiencyParams {
            skip_probability: 0.1,
            min_efficiency: 0.6,
            max_efficiency: 1.0,
            forklifts: 2,
            items_per_trip: 2,
            trips_per_period: 3,
        }
    }
}

impl EfficiencyParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.skip_probability) {
            return Err(ConfigError::InvalidSkipProbability(self.skip_probability));
        }

        let (min, max) = (self.min_efficiency, self.max_efficiency);
        if !(min > 0.0 && min <= max && max <= 1.0) {
            return Err(ConfigError::InvalidEfficiencyRange { min, max });
        }

        if self.forklifts == 0 {
            return Err(ConfigError::ZeroThroughput("forklifts"));
        }
        if self.items_per_trip == 0 {
            return Err(ConfigError::ZeroThroughput("items_per_trip"));
        }
        if self.trips_per_period == 0 {
            return Err(ConfigError::ZeroThroughput("trips_per_period"));
        }

        self.checked_throughput()
            .map(|_| ())
            .ok_or(ConfigError::ThroughputOverflow)
    }

    fn checked_throughput(&self) -> Option<u64> {
        u64::from(self.forklifts)
            .checked_mul(u64::from(self.items_per_trip))?
            .checked_mul(u64::from(self.trips_per_period))
    }

    /// Items one area can release per period at full efficiency
    pub fn throughput(&self) -> u64 {
        self.checked_throughput().unwrap_or(u64::MAX)
    }
}

/// FIFO departures with per-area skips and efficiency-scaled removal caps
#[derive(Debug, Clone)]
pub struct EfficiencyPerturbedPolicy {
    params: EfficiencyParams,
    efficiency: Uniform<f64>,
}

impl EfficiencyPerturbedPolicy {
    pub fn new(params: EfficiencyParams) -> Result<Self> {
        params.validate()?;
        Ok(EfficiencyPerturbedPolicy {
            params,
            efficiency: Uniform::new_inclusive(params.min_efficiency, params.max_efficiency),
        })
    }

    pub fn params(&self) -> &EfficiencyParams {
        &self.params
    }

    /// Removal cap for every area this period; 0 for skipped areas
    fn draw_caps(&self, areas: &[StorageArea], rng: &mut SimRng) -> Vec<usize> {
        let throughput = self.params.throughput() as f64;

        areas
            .iter()
            .map(|area| {
                if rng.gen_bool(self.params.skip_probability) {
                    trace!(area = %area.id(), "area skipped this period");
                    return 0;
                }
                let efficiency = self.efficiency.sample(rng);
                (throughput * efficiency).floor() as usize
            })
            .collect()
    }
}

impl DeparturePolicy for EfficiencyPerturbedPolicy {
    fn release(
        &self,
        areas: &mut [StorageArea],
        demand: u32,
        rng: &mut SimRng,
        departed: &mut Vec<Departure>,
    ) -> u32 {
        let caps = self.draw_caps(areas, rng);
        let mut taken = vec![0usize; areas.len()];

        for attempt in 0..demand {
            let eligible = areas
                .iter_mut()
                .enumerate()
                .find(|(index, area)| !area.is_empty() && taken[*index] < caps[*index]);

            let Some((index, area)) = eligible else {
                return demand - attempt;
            };
            if let Some(item) = area.release() {
                taken[index] += 1;
                departed.push(Departure {
                    area: area.id(),
                    item,
                });
            }
        }
        0
    }

    fn name(&self) -> &str {
        "EfficiencyPerturbed"
    }
}

/// Serializable choice of departure policy
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum DeparturePolicyConfig {
    #[default]
    Simple,
    EfficiencyPerturbed(EfficiencyParams),
}

impl DeparturePolicyConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            DeparturePolicyConfig::Simple => Ok(()),
            DeparturePolicyConfig::EfficiencyPerturbed(params) => params.validate(),
        }
    }

    pub fn build(&self) -> Result<Box<dyn DeparturePolicy>> {
        let policy: Box<dyn DeparturePolicy> = match self {
            DeparturePolicyConfig::Simple => Box::new(SimpleFifoPolicy::new()),
            DeparturePolicyConfig::EfficiencyPerturbed(params) => {
                Box::new(EfficiencyPerturbedPolicy::new(*params)?)
            }
        };
        Ok(policy)
    }
}
