//! Routes constrained by bike and dock availability.
//!
//! The plain router picks the station nearest to each address. Here the
//! pick-up station must have a bike and the drop-off station a free dock;
//! when the nearest station fails its check the search widens outwards,
//! one station at a time, until a suitable one is found.

use tracing::debug;

use crate::domain::{Availability, Coordinate, Inventory, StationId};
use crate::geocode::Geocoder;
use crate::geomath;
use crate::graph::{PositionIndex, StationGraph};

use super::route::{NoRoute, RouteOutcome};
use super::router::{PlanError, Router, route_between};

/// Route planner that only uses stations able to serve the trip.
pub struct AvailabilityRouter<'a, G: Geocoder> {
    router: Router<'a, G>,
}

impl<'a, G: Geocoder> AvailabilityRouter<'a, G> {
    /// Wrap a router with availability checks.
    pub fn new(router: Router<'a, G>) -> Self {
        Self { router }
    }

    /// Plan the fastest route whose first station has at least one bike
    /// and whose last station has at least one free dock.
    ///
    /// Stations missing from `inventory` are treated as having nothing
    /// available.
    pub async fn plan_valid_route(
        &self,
        origin_address: &str,
        destination_address: &str,
        graph: &StationGraph,
        positions: &PositionIndex,
        inventory: &Inventory,
    ) -> Result<RouteOutcome, PlanError> {
        let (origin, destination) = match self
            .router
            .resolve_addresses(origin_address, destination_address)
            .await?
        {
            Ok(coords) => coords,
            Err(reason) => return Ok(RouteOutcome::NotFound(reason)),
        };

        if graph.is_empty() {
            return Ok(RouteOutcome::NotFound(NoRoute::EmptyGraph));
        }

        let (from, to) = match select_endpoints(origin, destination, graph, positions, inventory)
        {
            Ok(endpoints) => endpoints,
            Err(reason) => return Ok(RouteOutcome::NotFound(reason)),
        };

        Ok(route_between(
            origin,
            destination,
            &from,
            &to,
            graph,
            positions,
            self.router.config(),
        ))
    }
}

/// Pick the nearest station with a bike to `origin` and the nearest
/// station with a free dock to `destination`.
///
/// The origin side is checked first, so when neither side can be served
/// the result is [`NoRoute::NoBikesNearOrigin`].
pub fn select_endpoints(
    origin: Coordinate,
    destination: Coordinate,
    graph: &StationGraph,
    positions: &PositionIndex,
    inventory: &Inventory,
) -> Result<(StationId, StationId), NoRoute> {
    let from = nearest_matching(origin, graph, positions, inventory, Availability::has_bike)
        .ok_or(NoRoute::NoBikesNearOrigin)?;
    let to = nearest_matching(destination, graph, positions, inventory, Availability::has_dock)
        .ok_or(NoRoute::NoDocksNearDestination)?;

    debug!(from = %from, to = %to, "Selected stations with availability");
    Ok((from, to))
}

/// Widen outwards from `target` until a station passes `accept`.
fn nearest_matching(
    target: Coordinate,
    graph: &StationGraph,
    positions: &PositionIndex,
    inventory: &Inventory,
    accept: fn(&Availability) -> bool,
) -> Option<StationId> {
    let candidates = positions.iter().filter(|(id, _)| graph.contains(id));

    geomath::ranked_by_distance(candidates, target)
        .into_iter()
        .enumerate()
        .find_map(|(examined, (id, _))| {
            let ok = inventory.get(&id).is_some_and(|a| accept(&a));
            if !ok {
                debug!(station = %id, examined, "Station unavailable, widening search");
            }
            ok.then_some(id)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Station;
    use crate::geocode::StaticGeocoder;
    use crate::graph::build;
    use crate::planner::RouteConfig;

    fn sid(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn station(id: &str, lon: f64, bikes: u32, docks: u32) -> Station {
        Station::new(sid(id), "", Coordinate::new(0.0, lon), 10, bikes, docks).unwrap()
    }

    /// Stations every ~556 m along the equator, all connected.
    fn stations() -> Vec<Station> {
        vec![
            station("1", 0.000, 0, 10),
            station("2", 0.005, 4, 6),
            station("3", 0.010, 5, 5),
            station("4", 0.015, 10, 0),
        ]
    }

    fn geocoder() -> StaticGeocoder {
        StaticGeocoder::new()
            .with("west", Coordinate::new(0.0, -0.001))
            .with("east", Coordinate::new(0.0, 0.016))
    }

    #[tokio::test]
    async fn widens_past_empty_and_full_stations() {
        let stations = stations();
        let (graph, positions) = build(&stations, 600.0).unwrap();
        let inventory = Inventory::from_stations(&stations);
        let geocoder = geocoder();
        let config = RouteConfig::default();
        let router = AvailabilityRouter::new(Router::new(&geocoder, &config));

        let outcome = router
            .plan_valid_route("west", "east", &graph, &positions, &inventory)
            .await
            .unwrap();
        let route = outcome.route().unwrap();

        // Station 1 has no bikes and station 4 has no docks.
        assert_eq!(route.first_station(), Some(&sid("2")));
        assert_eq!(route.last_station(), Some(&sid("3")));
        assert!(route.access.is_some());
        assert!(route.egress.is_some());
    }

    #[tokio::test]
    async fn unconstrained_route_uses_nearest() {
        let stations = stations();
        let (graph, positions) = build(&stations, 600.0).unwrap();
        let geocoder = geocoder();
        let config = RouteConfig::default();
        let router = Router::new(&geocoder, &config);

        let outcome = router
            .plan_route("west", "east", &graph, &positions)
            .await
            .unwrap();
        let route = outcome.route().unwrap();
        assert_eq!(route.first_station(), Some(&sid("1")));
        assert_eq!(route.last_station(), Some(&sid("4")));
    }

    #[test]
    fn no_bikes_anywhere() {
        let stations = vec![station("1", 0.0, 0, 10), station("2", 0.005, 0, 10)];
        let (graph, positions) = build(&stations, 600.0).unwrap();
        let inventory = Inventory::from_stations(&stations);

        let result = select_endpoints(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.005),
            &graph,
            &positions,
            &inventory,
        );
        assert_eq!(result, Err(NoRoute::NoBikesNearOrigin));
    }

    #[test]
    fn no_docks_anywhere() {
        let stations = vec![station("1", 0.0, 10, 0), station("2", 0.005, 3, 0)];
        let (graph, positions) = build(&stations, 600.0).unwrap();
        let inventory = Inventory::from_stations(&stations);

        let result = select_endpoints(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.005),
            &graph,
            &positions,
            &inventory,
        );
        assert_eq!(result, Err(NoRoute::NoDocksNearDestination));
    }

    #[test]
    fn missing_inventory_counts_as_unavailable() {
        let stations = vec![station("1", 0.0, 5, 5), station("2", 0.005, 5, 5)];
        let (graph, positions) = build(&stations, 600.0).unwrap();
        let mut inventory = Inventory::new();
        inventory.insert(sid("2"), Availability::new(5, 5));

        let (from, to) = select_endpoints(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.0),
            &graph,
            &positions,
            &inventory,
        )
        .unwrap();
        assert_eq!(from, sid("2"));
        assert_eq!(to, sid("2"));
    }

    #[tokio::test]
    async fn valid_route_can_still_be_disconnected() {
        // Bikes only at 1, docks only at 2, and they are far apart.
        let stations = vec![station("1", 0.0, 5, 0), station("2", 0.05, 0, 5)];
        let (graph, positions) = build(&stations, 600.0).unwrap();
        let inventory = Inventory::from_stations(&stations);
        let geocoder = geocoder();
        let config = RouteConfig::default();
        let router = AvailabilityRouter::new(Router::new(&geocoder, &config));

        let outcome = router
            .plan_valid_route("west", "east", &graph, &positions, &inventory)
            .await
            .unwrap();
        assert_eq!(outcome.minutes(), -1);
        assert!(matches!(
            outcome,
            RouteOutcome::NotFound(NoRoute::Disconnected { .. })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::Station;
    use crate::graph::build;
    use proptest::prelude::*;

    fn network() -> impl Strategy<Value = Vec<Station>> {
        prop::collection::vec((0.0f64..0.03, 0u32..4, 0u32..4), 1..15).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (lon, bikes, docks))| {
                    Station::new(
                        StationId::parse(&i.to_string()).unwrap(),
                        "",
                        Coordinate::new(0.0, lon),
                        8,
                        bikes,
                        docks,
                    )
                    .unwrap()
                })
                .collect()
        })
    }

    proptest! {
        /// Chosen stations always have a bike and a dock respectively
        #[test]
        fn endpoints_are_serviceable(
            stations in network(),
            o in -0.01f64..0.04,
            d in -0.01f64..0.04,
        ) {
            let (graph, positions) = build(&stations, 800.0).unwrap();
            let inventory = Inventory::from_stations(&stations);
            let result = select_endpoints(
                Coordinate::new(0.0, o),
                Coordinate::new(0.0, d),
                &graph,
                &positions,
                &inventory,
            );

            match result {
                Ok((from, to)) => {
                    prop_assert!(inventory.get(&from).unwrap().bikes >= 1);
                    prop_assert!(inventory.get(&to).unwrap().docks >= 1);
                }
                Err(NoRoute::NoBikesNearOrigin) => {
                    prop_assert!(stations.iter().all(|s| s.bikes_available == 0));
                }
                Err(NoRoute::NoDocksNearDestination) => {
                    prop_assert!(stations.iter().all(|s| s.docks_available == 0));
                }
                Err(other) => prop_assert!(false, "unexpected outcome {other:?}"),
            }
        }
    }
}
