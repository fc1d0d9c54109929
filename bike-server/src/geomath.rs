//! Great-circle distances and nearest-station lookups.
//!
//! Distances use the haversine formula on a spherical Earth and are
//! expressed in metres.

use std::cmp::Ordering;

use geo::HaversineDistance;

use crate::domain::{Coordinate, StationId};

/// Mean Earth radius in metres, matching the radius `geo` uses for haversine.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two coordinates, in metres.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    a.to_point().haversine_distance(&b.to_point())
}

/// Degrees of longitude spanning `metres` along the equator.
///
/// Useful for placing fixtures at a known distance apart.
pub fn metres_to_degrees_lon_at_equator(metres: f64) -> f64 {
    (metres / EARTH_RADIUS_M).to_degrees()
}

/// All positions ordered by increasing distance from `target`.
///
/// Equidistant stations are ordered by id so the result is deterministic.
pub fn ranked_by_distance<'a, I>(positions: I, target: Coordinate) -> Vec<(StationId, f64)>
where
    I: IntoIterator<Item = (&'a StationId, &'a Coordinate)>,
{
    let mut ranked: Vec<(StationId, f64)> = positions
        .into_iter()
        .map(|(id, coord)| (id.clone(), distance(*coord, target)))
        .collect();
    ranked.sort_by(compare_candidates);
    ranked
}

/// The position closest to `target`, ties broken by lowest id.
///
/// Returns `None` when there are no positions.
pub fn nearest<'a, I>(positions: I, target: Coordinate) -> Option<(StationId, f64)>
where
    I: IntoIterator<Item = (&'a StationId, &'a Coordinate)>,
{
    positions
        .into_iter()
        .map(|(id, coord)| (id, distance(*coord, target)))
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(id, d)| (id.clone(), d))
}

fn compare_candidates(a: &(StationId, f64), b: &(StationId, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
}
