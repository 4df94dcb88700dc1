//! Core types shared across Stowage components

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Identifier of a storage area, 1-based and ordered by scan priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(pub usize);

impl AreaId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Area id for a 0-based position in the ordered area list
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// 0-based position in the ordered area list
    pub fn index(&self) -> usize {
        self.0.saturating_sub(1)
    }

    /// Column name used in snapshot tables, e.g. `area_1_occupancy`
    pub fn occupancy_column(&self) -> String {
        format!("area_{}_occupancy", self.0)
    }
}

impl std::fmt::Display for AreaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique item identifier: creation period plus the arrival's sequence number within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId {
    pub period: u64,
    pub sequence: u32,
}

impl ItemId {
    pub fn new(period: u64, sequence: u32) -> Self {
        Self { period, sequence }
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item_{}_{}", self.period, self.sequence)
    }
}

/// An opaque stored item. Only presence and order matter to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub timestamp: u64,
    pub id: ItemId,
}

impl Item {
    pub fn new(period: u64, sequence: u32) -> Self {
        Item {
            timestamp: period,
            id: ItemId::new(period, sequence),
        }
    }
}

/// Post-period occupancy of every area, indexed by area position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSnapshot {
    pub period: u64,
    pub occupancy: Vec<usize>,
}

impl PeriodSnapshot {
    pub fn new(period: u64, occupancy: Vec<usize>) -> Self {
        Self { period, occupancy }
    }

    /// Occupancy of a single area, `None` for an unknown id
    pub fn area(&self, id: AreaId) -> Option<usize> {
        if id.0 == 0 {
            return None;
        }
        self.occupancy.get(id.index()).copied()
    }

    /// Items held across all areas
    pub fn total(&self) -> usize {
        self.occupancy.iter().sum()
    }

    fn serialize_columns<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        for (index, count) in self.occupancy.iter().enumerate() {
            map.serialize_entry(&AreaId::from_index(index).occupancy_column(), count)?;
        }
        Ok(())
    }
}

// Flat record: {"period": 0, "area_1_occupancy": .., "area_K_occupancy": ..}
impl Serialize for PeriodSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.occupancy.len()))?;
        map.serialize_entry("period", &self.period)?;
        self.serialize_columns(&mut map)?;
        map.end()
    }
}

/// One row of the batch table: a snapshot tagged with its simulation index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodRow {
    pub simulation: usize,
    pub snapshot: PeriodSnapshot,
}

impl Serialize for PeriodRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.snapshot.occupancy.len()))?;
        map.serialize_entry("period", &self.snapshot.period)?;
        map.serialize_entry("simulation", &self.simulation)?;
        self.snapshot.serialize_columns(&mut map)?;
        map.end()
    }
}

/// Item flow totals for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub simulation: usize,
    pub stored: u64,
    pub removed: u64,
    /// Arrivals lost because every area was full
    pub dropped: u64,
    /// Departure attempts that found nothing eligible to remove
    pub unfulfilled: u64,
}

/// One run's full occupancy time series, ordered by period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationRun {
    pub simulation: usize,
    pub snapshots: Vec<PeriodSnapshot>,
    pub totals: RunTotals,
}

/// Flat table of all runs in an experiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationBatch {
    num_areas: usize,
    rows: Vec<PeriodRow>,
    totals: Vec<RunTotals>,
}

impl SimulationBatch {
    /// Concatenate runs in the order given, tagging each snapshot with its run's index
    pub fn from_runs(num_areas: usize, runs: impl IntoIterator<Item = SimulationRun>) -> Self {
        let mut rows = Vec::new();
        let mut totals = Vec::new();

        for run in runs {
            let simulation = run.simulation;
            rows.extend(
                run.snapshots
                    .into_iter()
                    .map(|snapshot| PeriodRow { simulation, snapshot }),
            );
            totals.push(run.totals);
        }

        SimulationBatch {
            num_areas,
            rows,
            totals,
        }
    }

    pub fn num_areas(&self) -> usize {
        self.num_areas
    }

    pub fn num_simulations(&self) -> usize {
        self.totals.len()
    }

    pub fn rows(&self) -> &[PeriodRow] {
        &self.rows
    }

    pub fn totals(&self) -> &[RunTotals] {
        &self.totals
    }

    /// Rows of a single run, in period order
    pub fn run(&self, simulation: usize) -> impl Iterator<Item = &PeriodRow> {
        self.rows
            .iter()
            .filter(move |row| row.simulation == simulation)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(simulation: usize, series: &[[usize; 2]]) -> SimulationRun {
        SimulationRun {
            simulation,
            snapshots: series
                .iter()
                .enumerate()
                .map(|(period, occupancy)| PeriodSnapshot::new(period as u64, occupancy.to_vec()))
                .collect(),
            totals: RunTotals {
                simulation,
                ..RunTotals::default()
            },
        }
    }

    #[test]
    fn test_area_id_positions() {
        let id = AreaId::from_index(0);
        assert_eq!(id, AreaId::new(1));
        assert_eq!(id.index(), 0);
        assert_eq!(AreaId::new(4).occupancy_column(), "area_4_occupancy");
    }

    #[test]
    fn test_item_id_display() {
        let item = Item::new(7, 12);
        assert_eq!(item.timestamp, 7);
        assert_eq!(item.id.to_string(), "item_7_12");
        assert!(ItemId::new(7, 12) < ItemId::new(8, 0));
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = PeriodSnapshot::new(3, vec![2, 1]);
        assert_eq!(snapshot.area(AreaId::new(1)), Some(2));
        assert_eq!(snapshot.area(AreaId::new(2)), Some(1));
        assert_eq!(snapshot.area(AreaId::new(3)), None);
        assert_eq!(snapshot.area(AreaId::new(0)), None);
        assert_eq!(snapshot.total(), 3);
    }

    #[test]
    fn test_row_serializes_flat_columns() {
        let row = PeriodRow {
            simulation: 2,
            snapshot: PeriodSnapshot::new(5, vec![92, 10]),
        };
        let value = serde_json::to_value(&row).unwrap();

        assert_eq!(value["period"], 5);
        assert_eq!(value["simulation"], 2);
        assert_eq!(value["area_1_occupancy"], 92);
        assert_eq!(value["area_2_occupancy"], 10);
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_batch_concatenates_runs_in_order() {
        let batch = SimulationBatch::from_runs(
            2,
            vec![run(0, &[[1, 0], [2, 0]]), run(1, &[[2, 1], [2, 2]])],
        );

        assert_eq!(batch.num_simulations(), 2);
        assert_eq!(batch.len(), 4);
        assert_eq!(batch.rows()[2].simulation, 1);
        assert_eq!(batch.rows()[2].snapshot.period, 0);

        let second: Vec<u64> = batch.run(1).map(|row| row.snapshot.period).collect();
        assert_eq!(second, vec![0, 1]);
        assert_eq!(batch.totals()[1].simulation, 1);
    }
}
