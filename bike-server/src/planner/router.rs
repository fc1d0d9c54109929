//! Shortest bike + walk routes between two addresses.

use tracing::debug;

use crate::domain::{Coordinate, StationId};
use crate::geocode::{GeocodeError, Geocoder};
use crate::geomath;
use crate::graph::{PositionIndex, StationGraph};

use super::config::RouteConfig;
use super::route::{NoRoute, Route, RouteOutcome, WalkLeg};

/// Error from route planning.
///
/// Missing addresses and disconnected stations are not errors; they are
/// reported as [`RouteOutcome::NotFound`].
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Caller-supplied parameter out of domain
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The geocoding service failed (as opposed to finding nothing)
    #[error("geocoder failed: {0}")]
    Geocoder(#[from] GeocodeError),
}

/// Route planner over a station graph.
pub struct Router<'a, G: Geocoder> {
    geocoder: &'a G,
    config: &'a RouteConfig,
}

impl<'a, G: Geocoder> Router<'a, G> {
    /// Create a new router.
    pub fn new(geocoder: &'a G, config: &'a RouteConfig) -> Self {
        Self { geocoder, config }
    }

    pub fn config(&self) -> &RouteConfig {
        self.config
    }

    /// Plan the fastest route from one address to another.
    ///
    /// Each address is walked to (or from) its nearest station, and the
    /// ride between the two stations follows the shortest path in `graph`.
    pub async fn plan_route(
        &self,
        origin_address: &str,
        destination_address: &str,
        graph: &StationGraph,
        positions: &PositionIndex,
    ) -> Result<RouteOutcome, PlanError> {
        let (origin, destination) = match self
            .resolve_addresses(origin_address, destination_address)
            .await?
        {
            Ok(coords) => coords,
            Err(reason) => return Ok(RouteOutcome::NotFound(reason)),
        };

        let nodes = || {
            positions
                .iter()
                .filter(|(id, _)| graph.contains(id))
        };
        let (Some((from, _)), Some((to, _))) = (
            geomath::nearest(nodes(), origin),
            geomath::nearest(nodes(), destination),
        ) else {
            return Ok(RouteOutcome::NotFound(NoRoute::EmptyGraph));
        };

        Ok(route_between(
            origin,
            destination,
            &from,
            &to,
            graph,
            positions,
            self.config,
        ))
    }

    /// Geocode both addresses concurrently.
    ///
    /// The inner `Err` names the addresses that could not be found.
    pub(crate) async fn resolve_addresses(
        &self,
        origin_address: &str,
        destination_address: &str,
    ) -> Result<Result<(Coordinate, Coordinate), NoRoute>, PlanError> {
        let (origin, destination) = futures::future::join(
            self.geocoder.resolve(origin_address),
            self.geocoder.resolve(destination_address),
        )
        .await;

        match (origin?, destination?) {
            (Some(o), Some(d)) => Ok(Ok((o, d))),
            (o, d) => {
                debug!(
                    origin = origin_address,
                    destination = destination_address,
                    origin_found = o.is_some(),
                    destination_found = d.is_some(),
                    "Address lookup failed"
                );
                Ok(Err(NoRoute::AddressUnresolved {
                    origin: o.is_none().then(|| origin_address.to_string()),
                    destination: d.is_none().then(|| destination_address.to_string()),
                }))
            }
        }
    }
}

/// Compose a route between two resolved coordinates through the given
/// pick-up and drop-off stations.
///
/// Returns [`NoRoute::Disconnected`] when the stations are not connected.
/// When both stations are the same, the route is walking only.
pub fn route_between(
    origin: Coordinate,
    destination: Coordinate,
    from: &StationId,
    to: &StationId,
    graph: &StationGraph,
    positions: &PositionIndex,
    config: &RouteConfig,
) -> RouteOutcome {
    let Some((ride_distance, stations)) = graph.shortest_path(from, to) else {
        debug!(from = %from, to = %to, "No path between stations");
        return RouteOutcome::NotFound(NoRoute::Disconnected {
            from: from.clone(),
            to: to.clone(),
        });
    };

    let ride_path: Vec<Coordinate> = stations
        .iter()
        .filter_map(|id| positions.get(id).copied())
        .collect();
    let (Some(&first), Some(&last)) = (ride_path.first(), ride_path.last()) else {
        return RouteOutcome::NotFound(NoRoute::EmptyGraph);
    };

    let access = walk_leg(origin, first);
    let egress = walk_leg(last, destination);

    let walked = access.as_ref().map_or(0.0, |l| l.distance)
        + egress.as_ref().map_or(0.0, |l| l.distance);
    let duration = config.walking_time(walked) + config.biking_time(ride_distance);

    debug!(
        from = %from,
        to = %to,
        stops = stations.len(),
        ride_m = ride_distance,
        walk_m = walked,
        "Route planned"
    );

    RouteOutcome::Found(Route {
        origin,
        destination,
        access,
        stations,
        ride_path,
        ride_distance,
        egress,
        duration,
    })
}

fn walk_leg(from: Coordinate, to: Coordinate) -> Option<WalkLeg> {
    let distance = geomath::distance(from, to);
    (distance > 0.0).then_some(WalkLeg { from, to, distance })
}
