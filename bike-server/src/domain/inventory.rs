//! Bike and dock availability snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::station::{Station, StationId};

/// Bikes and free docks at one station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub bikes: u32,
    pub docks: u32,
}

impl Availability {
    pub fn new(bikes: u32, docks: u32) -> Self {
        Self { bikes, docks }
    }

    pub fn has_bike(&self) -> bool {
        self.bikes >= 1
    }

    pub fn has_dock(&self) -> bool {
        self.docks >= 1
    }
}

/// Availability per station, taken at a single point in time.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    entries: HashMap<StationId, Availability>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an inventory from the availability fields of station records.
    pub fn from_stations(stations: &[Station]) -> Self {
        stations
            .iter()
            .map(|s| {
                (
                    s.id.clone(),
                    Availability::new(s.bikes_available, s.docks_available),
                )
            })
            .collect()
    }

    pub fn insert(&mut self, id: StationId, availability: Availability) {
        self.entries.insert(id, availability);
    }

    pub fn get(&self, id: &StationId) -> Option<Availability> {
        self.entries.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(StationId, Availability)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (StationId, Availability)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
