//! Plot data for map renderers.
//!
//! The renderer itself lives outside this crate; it receives node
//! positions and edge endpoints and draws them on a map.

use serde::Serialize;

use super::{PositionIndex, StationGraph};
use crate::domain::{Coordinate, StationId};

/// A station marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotNode {
    pub id: StationId,
    pub coordinate: Coordinate,
}

/// A line between two connected stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotEdge {
    pub from: Coordinate,
    pub to: Coordinate,
    pub distance: f64,
}

/// Everything needed to draw the graph over a map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphPlot {
    pub nodes: Vec<PlotNode>,
    pub edges: Vec<PlotEdge>,
}

impl GraphPlot {
    /// Collect plot data for `graph`. Nodes without a known position are skipped.
    pub fn new(graph: &StationGraph, positions: &PositionIndex) -> Self {
        let nodes = graph
            .station_ids()
            .filter_map(|id| {
                positions.get(id).map(|&coordinate| PlotNode {
                    id: id.clone(),
                    coordinate,
                })
            })
            .collect();

        let edges = graph
            .edges()
            .filter_map(|(a, b, distance)| {
                Some(PlotEdge {
                    from: *positions.get(a)?,
                    to: *positions.get(b)?,
                    distance,
                })
            })
            .collect();

        Self { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Station;
    use crate::graph::build;

    #[test]
    fn plot_mirrors_graph() {
        let stations: Vec<Station> = [(0.0, 0.0), (0.0, 0.005), (0.0, 0.02)]
            .iter()
            .enumerate()
            .map(|(i, &(lat, lon))| {
                Station::new(
                    StationId::parse(&(i + 1).to_string()).unwrap(),
                    "",
                    Coordinate::new(lat, lon),
                    4,
                    2,
                    2,
                )
                .unwrap()
            })
            .collect();
        let (graph, positions) = build(&stations, 1000.0).unwrap();

        let plot = GraphPlot::new(&graph, &positions);
        assert_eq!(plot.nodes.len(), 3);
        assert_eq!(plot.edges.len(), 1);
        assert_eq!(plot.edges[0].from, Coordinate::new(0.0, 0.0));
        assert_eq!(plot.edges[0].to, Coordinate::new(0.0, 0.005));
    }
}
