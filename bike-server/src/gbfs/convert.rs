//! Join GBFS information and status records into stations.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::types::{StationInformation, StationStatus};
use crate::domain::{Coordinate, Station, StationId};

/// Join the two feeds on `station_id`.
///
/// Stations without a status record, with an unusable id or with an
/// invalid position are skipped. When the reported bikes and docks add
/// up to more than the published capacity, the capacity is raised to
/// match. The result is ordered by station id.
pub fn join_feeds(information: Vec<StationInformation>, status: Vec<StationStatus>) -> Vec<Station> {
    let status: HashMap<String, StationStatus> = status
        .into_iter()
        .map(|s| (s.station_id.trim().to_string(), s))
        .collect();

    let mut stations = Vec::with_capacity(information.len());
    let mut unmatched = 0usize;

    for info in information {
        let Ok(id) = StationId::parse(&info.station_id) else {
            warn!(station_id = %info.station_id, "Skipping station with blank id");
            continue;
        };
        let Some(state) = status.get(id.as_str()) else {
            unmatched += 1;
            continue;
        };

        let bikes = state.num_bikes_available;
        let docks = state.num_docks_available;
        let mut capacity = info.capacity.unwrap_or(0);
        let occupied = bikes.saturating_add(docks);
        if occupied > capacity {
            warn!(
                station = %id,
                bikes,
                docks,
                capacity,
                "Reported availability exceeds capacity, raising capacity"
            );
            capacity = occupied;
        }

        let address = info.address.or(info.name).unwrap_or_default();
        match Station::new(
            id,
            address,
            Coordinate::new(info.lat, info.lon),
            capacity,
            bikes,
            docks,
        ) {
            Ok(station) => stations.push(station),
            Err(e) => warn!(error = %e, "Skipping station"),
        }
    }

    if unmatched > 0 {
        debug!(unmatched, "Stations without a status record");
    }

    stations.sort_by(|a, b| a.id.cmp(&b.id));
    stations
}
