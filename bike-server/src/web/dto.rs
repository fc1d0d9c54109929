//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, StationId};
use crate::planner::RouteOutcome;
use crate::rebalance::{RebalanceReport, Transfer};

/// Body of `POST /graph`.
///
/// `distance` is kept loose so that a non-numeric value can be answered
/// with a friendly message instead of a deserialisation error.
#[derive(Debug, Default, Deserialize)]
pub struct GraphRequest {
    pub distance: Option<serde_json::Value>,
}

/// How the `distance` field of a [`GraphRequest`] reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceArg {
    Missing,
    Number(f64),
    NotANumber,
}

impl GraphRequest {
    /// Interpret the requested distance. Accepts JSON numbers and
    /// numeric strings.
    pub fn distance(&self) -> DistanceArg {
        let parsed = match &self.distance {
            None | Some(serde_json::Value::Null) => return DistanceArg::Missing,
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
        };
        parsed.map_or(DistanceArg::NotANumber, DistanceArg::Number)
    }
}

/// Summary of a freshly built graph.
#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub message: String,
    pub distance: f64,
    pub nodes: usize,
    pub edges: usize,
    pub components: usize,
}

/// A single count, with the sentence the bot would reply.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
    pub message: String,
}

/// Query of `GET /route` and `GET /valid_route`.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub origin: String,
    pub destination: String,
}

/// A planned route, or the reason there is none.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    /// Travel time in minutes, `-1` when there is no route
    pub minutes: i64,
    pub message: String,
    /// Origin, stations and destination in travel order
    pub polyline: Vec<Coordinate>,
    pub stations: Vec<StationId>,
    /// Metres ridden, when a route exists
    pub ride_distance: Option<f64>,
    /// Metres walked, when a route exists
    pub walking_distance: Option<f64>,
}

impl RouteResponse {
    pub fn from_outcome(outcome: &RouteOutcome) -> Self {
        match outcome.route() {
            Some(route) => Self {
                minutes: route.minutes(),
                message: format!(
                    "This route will take you to your destination in {} minutes.",
                    route.minutes()
                ),
                polyline: route.coordinates(),
                stations: route.stations.clone(),
                ride_distance: Some(route.ride_distance),
                walking_distance: Some(route.walking_distance()),
            },
            None => Self {
                minutes: outcome.minutes(),
                message: outcome.message().unwrap_or_default(),
                polyline: Vec::new(),
                stations: Vec::new(),
                ride_distance: None,
                walking_distance: None,
            },
        }
    }
}

/// Query of `GET /distribute`. Values are validated by the handler.
#[derive(Debug, Deserialize)]
pub struct DistributeRequest {
    pub min_bikes: Option<String>,
    pub min_docks: Option<String>,
}

/// Result of a rebalancing run.
#[derive(Debug, Serialize)]
pub struct DistributeResponse {
    /// Total cost in metres
    pub total_cost: f64,
    pub total_cost_km: f64,
    pub feasible: bool,
    pub max_transfer: Option<Transfer>,
    pub report: String,
}

impl DistributeResponse {
    pub fn from_report(report: &RebalanceReport) -> Self {
        let total_cost = report.total_cost();
        Self {
            total_cost,
            total_cost_km: total_cost / 1000.0,
            feasible: report.is_feasible(),
            max_transfer: report.max_transfer().cloned(),
            report: report.to_string(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
