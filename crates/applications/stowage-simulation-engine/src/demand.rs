//! Per-period demand models for arrivals and departures
//!
//! Demand is a count drawn once per period:
//! - Poisson: identically distributed draws with a fixed intensity λ
//! - Idle: λ = 0, always zero (rand_distr rejects a zero-intensity Poisson)
//! - Scripted: a fixed count per period, zero once the script runs out
//!
//! Demand counts are `u32`, so Poisson intensities above `u32::MAX` are rejected.

use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use stowage_core::{ConfigError, Result};

use crate::rng::SimRng;

/// Largest accepted Poisson intensity
pub const MAX_INTENSITY: f64 = u32::MAX as f64;

/// Serializable description of a demand process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum DemandConfig {
    Poisson { rate: f64 },
    Scripted { counts: Vec<u32> },
}

impl DemandConfig {
    pub fn poisson(rate: f64) -> Self {
        DemandConfig::Poisson { rate }
    }

    pub fn scripted(counts: impl Into<Vec<u32>>) -> Self {
        DemandConfig::Scripted {
            counts: counts.into(),
        }
    }

    /// Mean demand per period, where it is defined by a single intensity
    pub fn rate(&self) -> Option<f64> {
        match self {
            DemandConfig::Poisson { rate } => Some(*rate),
            DemandConfig::Scripted { .. } => None,
        }
    }
}

/// Validated demand process, ready to sample
#[derive(Debug, Clone)]
pub enum DemandModel {
    Idle,
    Poisson(Poisson<f64>),
    Scripted(Vec<u32>),
}

impl DemandModel {
    /// Build a model; `name` labels the intensity in configuration errors
    pub fn from_config(name: &'static str, config: &DemandConfig) -> Result<Self> {
        match config {
            DemandConfig::Poisson { rate } => Self::poisson(name, *rate),
            DemandConfig::Scripted { counts } => Ok(Self::scripted(counts.clone())),
        }
    }

    pub fn poisson(name: &'static str, rate: f64) -> Result<Self> {
        let invalid = ConfigError::InvalidIntensity { name, value: rate };

        if !rate.is_finite() || !(0.0..=MAX_INTENSITY).contains(&rate) {
            return Err(invalid);
        }
        if rate == 0.0 {
            return Ok(DemandModel::Idle);
        }

        Poisson::new(rate)
            .map(DemandModel::Poisson)
            .map_err(|_| invalid)
    }

    pub fn scripted(counts: Vec<u32>) -> Self {
        DemandModel::Scripted(counts)
    }

    /// Demand for `period`
    pub fn sample(&self, period: u64, rng: &mut SimRng) -> u32 {
        match self {
            DemandModel::Idle => 0,
            DemandModel::Poisson(poisson) => {
                let draw: f64 = poisson.sample(rng);
                // Tail draws near the intensity ceiling saturate
                draw.min(MAX_INTENSITY) as u32
            }
            DemandModel::Scripted(counts) => usize::try_from(period)
                .ok()
                .and_then(|index| counts.get(index).copied())
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::run_rng;

    #[test]
    fn test_scripted_runs_out_to_zero() {
        let model = DemandModel::scripted(vec![3, 0, 5]);
        let mut rng = run_rng(1, 0);

        assert_eq!(model.sample(0, &mut rng), 3);
        assert_eq!(model.sample(1, &mut rng), 0);
        assert_eq!(model.sample(2, &mut rng), 5);
        assert_eq!(model.sample(3, &mut rng), 0);
    }

    #[test]
    fn test_zero_rate_is_idle() {
        let model = DemandModel::poisson("arrival", 0.0).unwrap();
        let mut rng = run_rng(1, 0);
        assert!(matches!(model, DemandModel::Idle));
        assert!((0..50).all(|period| model.sample(period, &mut rng) == 0));
    }

    #[test]
    fn test_rejects_negative_and_non_finite_rates() {
        assert_eq!(
            DemandModel::poisson("departure", -1.0).unwrap_err(),
            ConfigError::InvalidIntensity {
                name: "departure",
                value: -1.0
            }
        );
        assert!(DemandModel::poisson("arrival", f64::NAN).is_err());
        assert!(DemandModel::poisson("arrival", f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_rates_beyond_count_range() {
        assert_eq!(
            DemandModel::poisson("departure", 1e12).unwrap_err(),
            ConfigError::InvalidIntensity {
                name: "departure",
                value: 1e12
            }
        );
        assert!(DemandModel::poisson("arrival", MAX_INTENSITY).is_ok());
    }

    #[test]
    fn test_poisson_sample_mean() {
        let model = DemandModel::from_config("arrival", &DemandConfig::poisson(100.0)).unwrap();
        let mut rng = run_rng(7, 0);

        let samples = 2000;
        let total: u64 = (0..samples)
            .map(|period| model.sample(period, &mut rng) as u64)
            .sum();
        let mean = total as f64 / samples as f64;

        assert!((98.0..102.0).contains(&mean), "sample mean {mean}");
    }

    #[test]
    fn test_config_roundtrip_tagging() {
        let config: DemandConfig =
            serde_json::from_str(r#"{"model":"poisson","rate":80.0}"#).unwrap();
        assert_eq!(config, DemandConfig::poisson(80.0));
        assert_eq!(config.rate(), Some(80.0));

        let config: DemandConfig =
            serde_json::from_str(r#"{"model":"scripted","counts":[3]}"#).unwrap();
        assert_eq!(config, DemandConfig::scripted(vec![3]));
        assert_eq!(config.rate(), None);
    }
}
