//! Geometric station graph.
//!
//! Stations are nodes; two stations are joined by an undirected edge when
//! their great-circle distance is within a threshold. The graph is built
//! once per request from a station snapshot and never mutated afterwards.

mod builder;
mod config;
mod plot;

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;

use crate::domain::{Coordinate, StationId};

pub use builder::build;
pub use config::{DEFAULT_MAX_DISTANCE_M, GraphConfig};
pub use plot::{GraphPlot, PlotEdge, PlotNode};

/// Coordinates of every node, keyed by station id.
pub type PositionIndex = HashMap<StationId, Coordinate>;

/// Error from graph construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Caller-supplied parameter out of domain
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Two stations in the input share an id
    #[error("duplicate station id {0}")]
    DuplicateStation(StationId),
}

/// Undirected graph of stations weighted by distance in metres.
///
/// Invariants: no self-loops, at most one edge per station pair, and
/// every weight is strictly positive.
#[derive(Debug, Clone, Default)]
pub struct StationGraph {
    graph: UnGraph<StationId, f64>,
    nodes: HashMap<StationId, NodeIndex>,
}

impl StationGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: &StationId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Station ids in node order.
    pub fn station_ids(&self) -> impl Iterator<Item = &StationId> {
        self.graph.node_weights()
    }

    /// Weight of the edge between two stations, if they are adjacent.
    pub fn edge_weight(&self, a: &StationId, b: &StationId) -> Option<f64> {
        let (&na, &nb) = (self.nodes.get(a)?, self.nodes.get(b)?);
        let edge = self.graph.find_edge(na, nb)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Stations adjacent to `id` with the connecting distance.
    pub fn neighbors(&self, id: &StationId) -> Vec<(StationId, f64)> {
        let Some(&node) = self.nodes.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges(node)
            .map(|e| {
                let other = if e.source() == node { e.target() } else { e.source() };
                (self.graph[other].clone(), *e.weight())
            })
            .collect()
    }

    /// Every edge once, as `(a, b, distance)`.
    pub fn edges(&self) -> impl Iterator<Item = (&StationId, &StationId, f64)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], *e.weight()))
    }

    /// Connected components.
    ///
    /// Each component lists its stations in id order, and components are
    /// ordered by their lowest station id.
    pub fn components(&self) -> Vec<Vec<StationId>> {
        let mut sets = UnionFind::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut groups: BTreeMap<usize, Vec<StationId>> = BTreeMap::new();
        for node in self.graph.node_indices() {
            groups
                .entry(sets.find(node.index()))
                .or_default()
                .push(self.graph[node].clone());
        }

        let mut components: Vec<Vec<StationId>> = groups
            .into_values()
            .map(|mut members| {
                members.sort();
                members
            })
            .collect();
        components.sort_by(|a, b| a[0].cmp(&b[0]));
        components
    }

    pub fn component_count(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    /// Shortest path between two stations by total distance.
    ///
    /// Returns the distance and the stations visited, both endpoints
    /// included. `None` if either station is unknown or they are not
    /// connected.
    pub fn shortest_path(
        &self,
        from: &StationId,
        to: &StationId,
    ) -> Option<(f64, Vec<StationId>)> {
        let start = *self.nodes.get(from)?;
        let goal = *self.nodes.get(to)?;

        // All weights are positive, so A* with a zero heuristic is Dijkstra.
        let (distance, path) = petgraph::algo::astar(
            &self.graph,
            start,
            |n| n == goal,
            |e| *e.weight(),
            |_| 0.0,
        )?;

        Some((
            distance,
            path.into_iter().map(|n| self.graph[n].clone()).collect(),
        ))
    }

    fn add_station(&mut self, id: StationId) -> Result<NodeIndex, GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateStation(id));
        }
        let node = self.graph.add_node(id.clone());
        self.nodes.insert(id, node);
        Ok(node)
    }

    fn connect(&mut self, a: NodeIndex, b: NodeIndex, distance: f64) {
        self.graph.add_edge(a, b, distance);
    }
}
