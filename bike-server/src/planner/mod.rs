//! Route planner over the station graph.
//!
//! Answers "what is the fastest way from this address to that one by
//! shared bike?". A route walks to a station, rides along graph edges
//! and walks from the last station to the destination. The availability
//! variant additionally requires a bike at the first station and a free
//! dock at the last.

mod availability;
mod config;
mod route;
mod router;

pub use availability::{AvailabilityRouter, select_endpoints};
pub use config::RouteConfig;
pub use route::{NoRoute, Route, RouteOutcome, WalkLeg};
pub use router::{PlanError, Router, route_between};
