//! Per-component min-cost-flow formulation.
//!
//! Each station `v` must end with `lower <= bikes' <= upper`, where
//! `lower = min_bikes` and `upper = capacity - min_docks`. Writing
//! `out(v)` for the net number of bikes leaving `v`, that is
//! `bikes - upper <= out(v) <= bikes - lower`.
//!
//! The network has one node per station, a super source `S` feeding
//! stations that give bikes away and a super sink `T` draining stations
//! that take them, with an unbounded `T -> S` arc closing the
//! circulation. Mandatory outflows and inflows become lower bounds on
//! the `S -> v` and `v -> T` arcs; those are turned into node demands
//! served from an auxiliary source/sink pair. A saturating flow on the
//! auxiliary pair is a feasible circulation, and the cheapest one is the
//! cheapest set of transfers.
//!
//! A station with `min_bikes + min_docks > capacity` cannot meet both
//! minimums. Its bike minimum (capped at capacity) still holds, its dock
//! minimum is dropped, and it never takes in more bikes than it has or
//! needs. Any surplus it holds stays available to the rest of the
//! component.

use std::collections::HashMap;

use tracing::{debug, info};

use super::flow::{ArcId, MinCostFlow, UNBOUNDED};
use super::report::{
    ComponentOutcome, ComponentReport, InfeasibleStation, RebalanceReport, Transfer, TransferPlan,
};
use super::RebalanceError;
use crate::domain::{Inventory, Station, StationId};
use crate::graph::StationGraph;

/// Balance every component and render the report.
///
/// Returns the total cost in metres and the report text.
///
/// # Errors
///
/// See [`plan_rebalance`].
pub fn rebalance(
    min_bikes: i64,
    min_docks: i64,
    graph: &StationGraph,
    stations: &[Station],
    inventory: &Inventory,
) -> Result<(f64, String), RebalanceError> {
    let report = plan_rebalance(min_bikes, min_docks, graph, stations, inventory)?;
    Ok((report.total_cost(), report.to_string()))
}

/// Balance every connected component of `graph`.
///
/// Bike counts come from `inventory`; a station missing from it counts
/// as empty. Capacities come from `stations`.
///
/// # Errors
///
/// - [`RebalanceError::InvalidParameter`] if either minimum is negative.
/// - [`RebalanceError::UnknownStation`] if a graph node has no record in
///   `stations`.
pub fn plan_rebalance(
    min_bikes: i64,
    min_docks: i64,
    graph: &StationGraph,
    stations: &[Station],
    inventory: &Inventory,
) -> Result<RebalanceReport, RebalanceError> {
    if min_bikes < 0 {
        return Err(RebalanceError::InvalidParameter(format!(
            "min_bikes must not be negative, got {min_bikes}"
        )));
    }
    if min_docks < 0 {
        return Err(RebalanceError::InvalidParameter(format!(
            "min_docks must not be negative, got {min_docks}"
        )));
    }

    let records: HashMap<&StationId, &Station> = stations.iter().map(|s| (&s.id, s)).collect();

    let mut components = Vec::new();
    for members in graph.components() {
        let mut targets = Vec::with_capacity(members.len());
        for id in &members {
            let station = records
                .get(id)
                .ok_or_else(|| RebalanceError::UnknownStation(id.clone()))?;
            let bikes = inventory.get(id).map_or(0, |a| a.bikes);
            targets.push(Target::new(
                id.clone(),
                station.capacity,
                i64::from(bikes),
                min_bikes,
                min_docks,
            ));
        }
        components.push(balance_component(graph, members, &targets)?);
    }

    let report = RebalanceReport {
        min_bikes,
        min_docks,
        components,
    };
    info!(
        min_bikes,
        min_docks,
        components = report.components.len(),
        feasible = report.is_feasible(),
        cost = report.total_cost(),
        "Rebalanced network"
    );
    Ok(report)
}

/// One station's current bikes and allowed range.
#[derive(Debug, Clone)]
struct Target {
    id: StationId,
    capacity: u32,
    bikes: i64,
    lower: i64,
    upper: i64,
    impossible: bool,
}

impl Target {
    fn new(id: StationId, capacity: u32, bikes: i64, min_bikes: i64, min_docks: i64) -> Self {
        let capacity_bikes = i64::from(capacity);
        let lower = min_bikes.min(capacity_bikes);
        let upper = capacity_bikes - min_docks;
        let impossible = min_bikes > upper;
        Self {
            id,
            capacity,
            bikes,
            lower,
            upper: if impossible { bikes.max(lower) } else { upper },
            impossible,
        }
    }

    /// Smallest allowed net outflow.
    fn min_out(&self) -> i64 {
        self.bikes - self.upper
    }

    /// Largest allowed net outflow.
    fn max_out(&self) -> i64 {
        self.bikes - self.lower
    }
}

fn balance_component(
    graph: &StationGraph,
    members: Vec<StationId>,
    targets: &[Target],
) -> Result<ComponentReport, RebalanceError> {
    let infeasible_stations: Vec<InfeasibleStation> = targets
        .iter()
        .filter(|t| t.impossible)
        .map(|t| InfeasibleStation {
            id: t.id.clone(),
            capacity: t.capacity,
        })
        .collect();

    let bikes: i64 = targets.iter().map(|t| t.bikes).sum();
    let lower: i64 = targets.iter().map(|t| t.lower).sum();
    let upper: i64 = targets.iter().map(|t| t.upper).sum();
    let bike_shortfall = (lower - bikes).max(0);
    let dock_shortfall = (bikes - upper).max(0);

    let outcome = if bike_shortfall > 0 || dock_shortfall > 0 {
        debug!(
            first = %members[0],
            bike_shortfall,
            dock_shortfall,
            "Component cannot be balanced"
        );
        ComponentOutcome::Infeasible {
            bike_shortfall: bike_shortfall.unsigned_abs(),
            dock_shortfall: dock_shortfall.unsigned_abs(),
        }
    } else if targets.iter().all(|t| t.min_out() <= 0 && t.max_out() >= 0) {
        ComponentOutcome::Balanced(TransferPlan::default())
    } else {
        ComponentOutcome::Balanced(solve_transfers(graph, &members, targets)?)
    };

    Ok(ComponentReport {
        stations: members,
        infeasible_stations,
        outcome,
    })
}

/// A graph edge and its two directed arcs in the flow network.
struct EdgeArcs {
    a: usize,
    b: usize,
    distance: f64,
    forward: ArcId,
    backward: ArcId,
}

/// Arc with a lower bound, recorded as demand on its endpoints.
fn add_bounded_arc(
    net: &mut MinCostFlow,
    excess: &mut [i64],
    from: usize,
    to: usize,
    lower: i64,
    upper: i64,
) {
    if upper <= 0 {
        return;
    }
    net.add_arc(from, to, upper - lower, 0.0);
    excess[to] += lower;
    excess[from] -= lower;
}

fn solve_transfers(
    graph: &StationGraph,
    members: &[StationId],
    targets: &[Target],
) -> Result<TransferPlan, RebalanceError> {
    let index: HashMap<&StationId, usize> =
        members.iter().enumerate().map(|(i, id)| (id, i)).collect();

    let mut net = MinCostFlow::new(members.len());
    let source = net.add_node();
    let sink = net.add_node();
    let mut excess = vec![0i64; net.node_count()];

    let mut edges = Vec::new();
    for (a, id) in members.iter().enumerate() {
        for (other, distance) in graph.neighbors(id) {
            let Some(&b) = index.get(&other) else {
                continue;
            };
            if b <= a {
                continue;
            }
            let forward = net.add_arc(a, b, UNBOUNDED, distance);
            let backward = net.add_arc(b, a, UNBOUNDED, distance);
            edges.push(EdgeArcs {
                a,
                b,
                distance,
                forward,
                backward,
            });
        }
    }

    for target in targets {
        let v = index[&target.id];
        let (min_out, max_out) = (target.min_out(), target.max_out());
        add_bounded_arc(&mut net, &mut excess, source, v, min_out.max(0), max_out.max(0));
        add_bounded_arc(&mut net, &mut excess, v, sink, (-max_out).max(0), (-min_out).max(0));
    }
    net.add_arc(sink, source, UNBOUNDED, 0.0);

    let aux_source = net.add_node();
    let aux_sink = net.add_node();
    let mut required = 0;
    for (node, &e) in excess.iter().enumerate() {
        if e > 0 {
            net.add_arc(aux_source, node, e, 0.0);
            required += e;
        } else if e < 0 {
            net.add_arc(node, aux_sink, -e, 0.0);
        }
    }

    let result = net.solve(aux_source, aux_sink, required);
    if result.flow < required {
        return Err(RebalanceError::Unrouted {
            station: members[0].clone(),
            missing: required - result.flow,
        });
    }

    let mut transfers: Vec<Transfer> = edges
        .iter()
        .filter_map(|e| {
            let net_flow = net.flow_on(e.forward) - net.flow_on(e.backward);
            let (from, to) = match net_flow {
                0 => return None,
                n if n > 0 => (e.a, e.b),
                _ => (e.b, e.a),
            };
            Some(Transfer {
                from: members[from].clone(),
                to: members[to].clone(),
                bikes: net_flow.unsigned_abs(),
                distance: e.distance,
            })
        })
        .collect();
    transfers.sort_by(|x, y| x.from.cmp(&y.from).then_with(|| x.to.cmp(&y.to)));

    debug!(
        first = %members[0],
        transfers = transfers.len(),
        cost = result.cost,
        "Solved component"
    );
    Ok(TransferPlan { transfers })
}
