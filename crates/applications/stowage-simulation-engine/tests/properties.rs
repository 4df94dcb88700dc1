//! Property-based tests for the period engine and runner.
//!
//! ## Properties
//! 1. **Bounds**: every area stays within `0..=capacity` in every period
//! 2. **Conservation**: occupancy changes by exactly stored minus removed
//! 3. **Sequential fill**: a non-full area is never skipped by arrivals
//! 4. **FIFO order**: items leave each area in the order they entered
//! 5. **Determinism / independence**: same seed, same series; different streams differ

use std::collections::VecDeque;

use proptest::prelude::*;
use stowage_core::ItemId;
use stowage_simulation_engine::{
    config::SimulationConfig,
    demand::DemandConfig,
    engine::PeriodEngine,
    policies::{DeparturePolicyConfig, EfficiencyParams},
    rng::run_rng,
    runner::SimulationRunner,
};

// ─────────────────────────────────────────────────────────────────────────────
// Strategies
// ─────────────────────────────────────────────────────────────────────────────

/// Random layout, intensities, policy and seed
fn config_strategy() -> impl Strategy<Value = SimulationConfig> {
    (
        prop::collection::vec(1usize..20, 1..6),
        0.0f64..30.0,
        0.0f64..30.0,
        any::<bool>(),
        any::<u64>(),
    )
        .prop_map(|(capacities, arrival_rate, departure_rate, perturbed, seed)| {
            let policy = if perturbed {
                DeparturePolicyConfig::EfficiencyPerturbed(EfficiencyParams::default())
            } else {
                DeparturePolicyConfig::Simple
            };
            SimulationConfig::default()
                .with_capacities(capacities)
                .with_arrivals(DemandConfig::poisson(arrival_rate))
                .with_departures(DemandConfig::poisson(departure_rate))
                .with_departure_policy(policy)
                .with_seed(seed)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_period_invariants(config in config_strategy(), periods in 1u64..60) {
        let engine = PeriodEngine::from_config(&config).unwrap();
        let capacities = engine.capacities().to_vec();
        let mut areas = engine.fresh_areas();
        let mut rng = run_rng(config.seed.unwrap_or_default(), 0);

        let mut previous = vec![0usize; capacities.len()];
        let mut held: Vec<VecDeque<ItemId>> = vec![VecDeque::new(); capacities.len()];

        for period in 0..periods {
            let outcome = engine.advance(&mut areas, period, &mut rng);
            let occupancy = &outcome.snapshot.occupancy;

            prop_assert_eq!(outcome.snapshot.period, period);
            prop_assert_eq!(
                outcome.stored() + outcome.dropped as usize,
                outcome.demand.arrivals as usize
            );
            prop_assert_eq!(
                outcome.removed() + outcome.unfulfilled as usize,
                outcome.demand.departures as usize
            );

            for index in 0..capacities.len() {
                let flow = outcome.flows[index];

                prop_assert!(occupancy[index] <= capacities[index]);
                prop_assert_eq!(occupancy[index], areas[index].occupancy());
                prop_assert_eq!(occupancy[index] + flow.removed, previous[index] + flow.stored);

                if index + 1 < capacities.len() && occupancy[index] < capacities[index] {
                    prop_assert_eq!(outcome.flows[index + 1].stored, 0);
                }
            }

            // Departures must match the front of what each area held
            for departure in &outcome.departed {
                let expected = held[departure.area.index()].pop_front();
                prop_assert_eq!(expected, Some(departure.item.id));
            }
            for (index, area) in areas.iter().enumerate() {
                let known = held[index].len();
                held[index].extend(area.items().skip(known).map(|item| item.id));

                let current: Vec<ItemId> = area.items().map(|item| item.id).collect();
                prop_assert_eq!(&current, &held[index].iter().copied().collect::<Vec<_>>());
                prop_assert!(current.windows(2).all(|pair| pair[0] < pair[1]));
            }

            previous = occupancy.clone();
        }
    }

    #[test]
    fn prop_same_seed_same_series(config in config_strategy(), periods in 1u64..40) {
        let first = SimulationRunner::new(&config).unwrap();
        let second = SimulationRunner::new(&config).unwrap();

        prop_assert_eq!(first.run_single(periods), second.run_single(periods));
    }

    #[test]
    fn prop_batch_rows_stay_in_bounds(
        config in config_strategy(),
        runs in 1usize..5,
        periods in 1u64..30,
    ) {
        let runner = SimulationRunner::new(&config).unwrap();
        let batch = runner.run_batch(runs, periods);

        prop_assert_eq!(batch.len(), runs * periods as usize);
        for row in batch.rows() {
            prop_assert!(row.simulation < runs);
            for (index, &occupancy) in row.snapshot.occupancy.iter().enumerate() {
                prop_assert!(occupancy <= config.capacities[index]);
            }
        }
    }
}

#[test]
fn test_runs_in_a_batch_are_independent() {
    let runner = SimulationRunner::new(&SimulationConfig::default().with_seed(7)).unwrap();
    let batch = runner.run_batch(2, 100);

    let first: Vec<_> = batch.run(0).map(|row| row.snapshot.clone()).collect();
    let second: Vec<_> = batch.run(1).map(|row| row.snapshot.clone()).collect();
    assert_ne!(first, second);
}

#[test]
fn test_different_seeds_differ() {
    let first = SimulationRunner::new(&SimulationConfig::default().with_seed(1)).unwrap();
    let second = SimulationRunner::new(&SimulationConfig::default().with_seed(2)).unwrap();

    assert_ne!(first.run_single(100), second.run_single(100));
}
