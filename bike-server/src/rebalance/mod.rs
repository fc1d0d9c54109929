//! Bike redistribution.
//!
//! Given minimum bike and free-dock targets, find the cheapest set of
//! transfers along graph edges that brings every station within target.
//! Components are balanced independently since no bike can cross between
//! them.

mod balance;
pub mod flow;
mod report;

use crate::domain::StationId;

pub use balance::{plan_rebalance, rebalance};
pub use report::{
    ComponentOutcome, ComponentReport, InfeasibleStation, RebalanceReport, Transfer, TransferPlan,
};

/// Error from a rebalancing run.
///
/// Infeasible targets are not errors; they are reported per component in
/// [`RebalanceReport`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RebalanceError {
    /// Caller-supplied parameter out of domain
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A graph node has no matching station record
    #[error("no station record for graph node {0}")]
    UnknownStation(StationId),

    /// The flow network could not route a demand that the totals allowed
    #[error("could not route {missing} bikes in the component of station {station}")]
    Unrouted { station: StationId, missing: i64 },
}
