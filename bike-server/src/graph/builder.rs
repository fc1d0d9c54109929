//! Build a geometric graph from a station snapshot.

use tracing::{debug, info};

use super::{GraphError, PositionIndex, StationGraph};
use crate::domain::Station;
use crate::geomath;

/// Build the geometric graph of `stations`.
///
/// Every unordered pair of stations whose great-circle distance is at
/// most `max_distance` metres is joined by an edge weighted with that
/// distance. The boundary is inclusive. Co-located stations (distance
/// zero) are left unconnected so every weight stays positive; each may
/// end up in its own component. Routing is unaffected, since nearest
/// station lookups resolve the tie to the lowest id, but rebalancing
/// never moves bikes directly between them.
///
/// Nodes are added in station id order, so the same snapshot always
/// yields the same graph.
///
/// # Errors
///
/// - [`GraphError::InvalidParameter`] if `max_distance` is not a positive
///   finite number.
/// - [`GraphError::DuplicateStation`] if two stations share an id.
pub fn build(
    stations: &[Station],
    max_distance: f64,
) -> Result<(StationGraph, PositionIndex), GraphError> {
    if !max_distance.is_finite() || max_distance <= 0.0 {
        return Err(GraphError::InvalidParameter(format!(
            "distance must be a positive number, got {max_distance}"
        )));
    }

    let mut ordered: Vec<&Station> = stations.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    let mut graph = StationGraph::default();
    let mut positions = PositionIndex::with_capacity(ordered.len());
    let mut nodes = Vec::with_capacity(ordered.len());

    for station in &ordered {
        nodes.push(graph.add_station(station.id.clone())?);
        positions.insert(station.id.clone(), station.coordinate);
    }

    for i in 0..ordered.len() {
        for j in (i + 1)..ordered.len() {
            let d = geomath::distance(ordered[i].coordinate, ordered[j].coordinate);
            if d > max_distance {
                continue;
            }
            if d <= 0.0 {
                debug!(
                    a = %ordered[i].id,
                    b = %ordered[j].id,
                    "Co-located stations, not connecting"
                );
                continue;
            }
            graph.connect(nodes[i], nodes[j], d);
        }
    }

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        max_distance,
        "Built station graph"
    );

    Ok((graph, positions))
}
