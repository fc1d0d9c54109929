//! Rebalancing results and their text rendering.

use std::fmt;

use serde::Serialize;

use crate::domain::StationId;

/// Bikes moved along one graph edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer {
    pub from: StationId,
    pub to: StationId,
    pub bikes: u64,
    /// Length of the edge in metres
    pub distance: f64,
}

impl Transfer {
    /// Cost of the transfer: distance times bikes moved.
    pub fn cost(&self) -> f64 {
        self.distance * self.bikes as f64
    }
}

/// The transfers that balance one component.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransferPlan {
    /// Ordered by origin then destination station
    pub transfers: Vec<Transfer>,
}

impl TransferPlan {
    pub fn total_cost(&self) -> f64 {
        self.transfers.iter().map(Transfer::cost).sum()
    }

    /// The most expensive single transfer. Ties go to the first in order.
    pub fn max_transfer(&self) -> Option<&Transfer> {
        self.transfers.iter().fold(None, |best: Option<&Transfer>, t| match best {
            Some(b) if b.cost() >= t.cost() => Some(b),
            _ => Some(t),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}

/// Whether a component could be balanced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComponentOutcome {
    Balanced(TransferPlan),
    /// Not enough bikes (or not enough free docks) in the component.
    Infeasible {
        bike_shortfall: u64,
        dock_shortfall: u64,
    },
}

/// A station whose capacity cannot hold both minimums at once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfeasibleStation {
    pub id: StationId,
    pub capacity: u32,
}

/// Result for one connected component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentReport {
    /// Members in id order
    pub stations: Vec<StationId>,
    pub infeasible_stations: Vec<InfeasibleStation>,
    pub outcome: ComponentOutcome,
}

impl ComponentReport {
    pub fn plan(&self) -> Option<&TransferPlan> {
        match &self.outcome {
            ComponentOutcome::Balanced(plan) => Some(plan),
            ComponentOutcome::Infeasible { .. } => None,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.plan().is_some()
    }

    pub fn cost(&self) -> f64 {
        self.plan().map_or(0.0, TransferPlan::total_cost)
    }
}

/// Result of a rebalancing run over the whole graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalanceReport {
    pub min_bikes: i64,
    pub min_docks: i64,
    /// Ordered by lowest member id
    pub components: Vec<ComponentReport>,
}

impl RebalanceReport {
    /// Total cost in metres, summed over balanced components.
    pub fn total_cost(&self) -> f64 {
        self.components.iter().map(ComponentReport::cost).sum()
    }

    pub fn transfers(&self) -> impl Iterator<Item = &Transfer> {
        self.components
            .iter()
            .filter_map(ComponentReport::plan)
            .flat_map(|p| p.transfers.iter())
    }

    pub fn is_feasible(&self) -> bool {
        self.components.iter().all(ComponentReport::is_feasible)
    }

    /// The most expensive transfer across all components.
    pub fn max_transfer(&self) -> Option<&Transfer> {
        self.components
            .iter()
            .filter_map(ComponentReport::plan)
            .filter_map(TransferPlan::max_transfer)
            .fold(None, |best: Option<&Transfer>, t| match best {
                Some(b) if b.cost() >= t.cost() => Some(b),
                _ => Some(t),
            })
    }
}

fn km(metres: f64) -> String {
    format!("{:.2} km", metres / 1000.0)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

impl fmt::Display for RebalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            let size = plural(component.stations.len(), "station", "stations");
            write!(f, "Component {} ({size}): ", i + 1)?;

            match &component.outcome {
                ComponentOutcome::Balanced(plan) if plan.is_empty() => {
                    writeln!(f, "nothing to move.")?;
                }
                ComponentOutcome::Balanced(plan) => {
                    writeln!(
                        f,
                        "{}, cost {}.",
                        plural(plan.transfers.len(), "transfer", "transfers"),
                        km(plan.total_cost())
                    )?;
                    if let Some(t) = plan.max_transfer() {
                        writeln!(
                            f,
                            "  Most expensive: {} from {} to {} ({}).",
                            plural(t.bikes as usize, "bike", "bikes"),
                            t.from,
                            t.to,
                            km(t.cost())
                        )?;
                    }
                }
                ComponentOutcome::Infeasible {
                    bike_shortfall,
                    dock_shortfall,
                } => {
                    let mut reasons = Vec::new();
                    if *bike_shortfall > 0 {
                        reasons.push(format!(
                            "{} short",
                            plural(*bike_shortfall as usize, "bike", "bikes")
                        ));
                    }
                    if *dock_shortfall > 0 {
                        reasons.push(format!(
                            "{} short",
                            plural(*dock_shortfall as usize, "dock", "docks")
                        ));
                    }
                    writeln!(f, "infeasible, {}.", reasons.join(" and "))?;
                }
            }

            for station in &component.infeasible_stations {
                writeln!(
                    f,
                    "  Station {} cannot keep {} bikes and {} docks with capacity {}.",
                    station.id, self.min_bikes, self.min_docks, station.capacity
                )?;
            }
        }

        write!(
            f,
            "Total cost of transferring bicycles: {}.",
            km(self.total_cost())
        )
    }
}
