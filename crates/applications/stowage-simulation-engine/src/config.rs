//! Simulation configuration
//!
//! All parameters are fixed at construction time. `Default` is the reference
//! configuration: four areas of capacity 92, 166, 170 and 226, Poisson(100)
//! arrivals and Poisson(80) departures under the simple FIFO policy.

use serde::{Deserialize, Serialize};

use stowage_core::{AreaId, ConfigError, Result};

use crate::demand::{DemandConfig, DemandModel};
use crate::policies::{DeparturePolicyConfig, EfficiencyParams};

/// Capacities of the reference four-area layout
pub const REFERENCE_CAPACITIES: [usize; 4] = [92, 166, 170, 226];

pub const REFERENCE_ARRIVAL_RATE: f64 = 100.0;
pub const REFERENCE_DEPARTURE_RATE: f64 = 80.0;

/// Construction-time parameters of the period engine and runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// One entry per area, in scan order
    pub capacities: Vec<usize>,
    pub arrivals: DemandConfig,
    pub departures: DemandConfig,
    pub departure_policy: DeparturePolicyConfig,
    /// Batch seed; drawn from entropy when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            capacities: REFERENCE_CAPACITIES.to_vec(),
            arrivals: DemandConfig::poisson(REFERENCE_ARRIVAL_RATE),
            departures: DemandConfig::poisson(REFERENCE_DEPARTURE_RATE),
            departure_policy: DeparturePolicyConfig::Simple,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Smaller-intensity preset with the efficiency-perturbed departure policy
    pub fn visual() -> Self {
        SimulationConfig {
            arrivals: DemandConfig::poisson(12.0),
            departures: DemandConfig::poisson(10.0),
            departure_policy: DeparturePolicyConfig::EfficiencyPerturbed(
                EfficiencyParams::default(),
            ),
            ..Self::default()
        }
    }

    pub fn with_capacities(mut self, capacities: impl Into<Vec<usize>>) -> Self {
        self.capacities = capacities.into();
        self
    }

    pub fn with_arrivals(mut self, arrivals: DemandConfig) -> Self {
        self.arrivals = arrivals;
        self
    }

    pub fn with_departures(mut self, departures: DemandConfig) -> Self {
        self.departures = departures;
        self
    }

    pub fn with_departure_policy(mut self, policy: DeparturePolicyConfig) -> Self {
        self.departure_policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn num_areas(&self) -> usize {
        self.capacities.len()
    }

    /// Check every parameter; the first violation is returned
    pub fn validate(&self) -> Result<()> {
        validate_capacities(&self.capacities)?;
        DemandModel::from_config("arrival", &self.arrivals)?;
        DemandModel::from_config("departure", &self.departures)?;
        self.departure_policy.validate()
    }
}

pub(crate) fn validate_capacities(capacities: &[usize]) -> Result<()> {
    if capacities.is_empty() {
        return Err(ConfigError::NoAreas);
    }

    if let Some(index) = capacities.iter().position(|&capacity| capacity == 0) {
        return Err(ConfigError::NonPositiveCapacity {
            area: AreaId::from_index(index),
            capacity: capacities[index],
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.num_areas(), 4);
        assert_eq!(config.arrivals.rate(), Some(100.0));
        assert_eq!(config.departures.rate(), Some(80.0));
        assert!(config.validate().is_ok());
        assert!(SimulationConfig::visual().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_areas() {
        let config = SimulationConfig::default().with_capacities(Vec::new());
        assert_eq!(config.validate(), Err(ConfigError::NoAreas));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = SimulationConfig::default().with_capacities([5, 0, 3]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveCapacity {
                area: AreaId::new(2),
                capacity: 0
            })
        );
    }

    #[test]
    fn test_rejects_negative_intensity() {
        let config = SimulationConfig::default().with_departures(DemandConfig::poisson(-3.0));
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidIntensity {
                name: "departure",
                value: -3.0
            })
        );
    }

    #[test]
    fn test_partial_json_uses_reference_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"capacities":[2,2],"seed":9}"#).unwrap();

        assert_eq!(config.capacities, vec![2, 2]);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.arrivals, DemandConfig::poisson(REFERENCE_ARRIVAL_RATE));
        assert_eq!(config.departure_policy, DeparturePolicyConfig::Simple);
    }
}
