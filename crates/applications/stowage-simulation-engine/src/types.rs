//! Per-period bookkeeping produced by the period engine

use serde::{Deserialize, Serialize};

use stowage_core::{AreaId, Item, PeriodSnapshot};

/// Arrival and departure counts drawn for one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demand {
    pub arrivals: u32,
    pub departures: u32,
}

impl Demand {
    pub fn new(arrivals: u32, departures: u32) -> Self {
        Demand { arrivals, departures }
    }
}

/// Items actually stored into and removed from one area during a period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaFlow {
    pub stored: usize,
    pub removed: usize,
}

/// An item released from an area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Departure {
    pub area: AreaId,
    pub item: Item,
}

/// Everything that happened in one period
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodOutcome {
    pub snapshot: PeriodSnapshot,
    pub demand: Demand,
    /// Indexed by area position
    pub flows: Vec<AreaFlow>,
    /// Arrivals lost because every area was full
    pub dropped: u32,
    /// Departure attempts with no eligible area
    pub unfulfilled: u32,
    /// Released items in removal order
    pub departed: Vec<Departure>,
}

impl PeriodOutcome {
    pub fn stored(&self) -> usize {
        self.flows.iter().map(|flow| flow.stored).sum()
    }

    pub fn removed(&self) -> usize {
        self.flows.iter().map(|flow| flow.removed).sum()
    }
}
