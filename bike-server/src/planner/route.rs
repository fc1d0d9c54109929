//! Planned routes and the reasons a route may be absent.

use std::fmt;

use chrono::Duration;

use crate::domain::{Coordinate, StationId};

/// A walking segment between an address and a station.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkLeg {
    pub from: Coordinate,
    pub to: Coordinate,
    /// Great-circle distance in metres.
    pub distance: f64,
}

/// A bike + walk route between two addresses.
///
/// The route walks from the origin to the first station, rides along
/// graph edges through `stations`, then walks from the last station to
/// the destination. Walking legs of zero length are omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub access: Option<WalkLeg>,
    /// Stations along the ride, endpoints included. A single station
    /// means no riding at all.
    pub stations: Vec<StationId>,
    /// Coordinates of `stations`, in order.
    pub ride_path: Vec<Coordinate>,
    /// Total length of the ride in metres.
    pub ride_distance: f64,
    pub egress: Option<WalkLeg>,
    /// Estimated door-to-door travel time.
    pub duration: Duration,
}

impl Route {
    /// Travel time rounded to the nearest whole minute.
    pub fn minutes(&self) -> i64 {
        (self.duration.num_milliseconds() as f64 / 60_000.0).round() as i64
    }

    /// Station where the bike is picked up.
    pub fn first_station(&self) -> Option<&StationId> {
        self.stations.first()
    }

    /// Station where the bike is returned.
    pub fn last_station(&self) -> Option<&StationId> {
        self.stations.last()
    }

    /// Combined length of the walking legs in metres.
    pub fn walking_distance(&self) -> f64 {
        self.access.as_ref().map_or(0.0, |l| l.distance)
            + self.egress.as_ref().map_or(0.0, |l| l.distance)
    }

    /// The full polyline from origin to destination.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut points = Vec::with_capacity(self.ride_path.len() + 2);
        if let Some(access) = &self.access {
            points.push(access.from);
        }
        points.extend(self.ride_path.iter().copied());
        if let Some(egress) = &self.egress {
            points.push(egress.to);
        }
        points
    }
}

/// Why no route could be produced.
///
/// These are expected outcomes the user can act on, not failures.
#[derive(Debug, Clone, PartialEq)]
pub enum NoRoute {
    /// Geocoding found nothing for one or both addresses. Each field
    /// holds the address that failed, if it did.
    AddressUnresolved {
        origin: Option<String>,
        destination: Option<String>,
    },

    /// The graph has no stations to route through.
    EmptyGraph,

    /// The chosen stations lie in different connected components.
    Disconnected { from: StationId, to: StationId },

    /// No station in the graph has a bike to pick up.
    NoBikesNearOrigin,

    /// No station in the graph has a free dock to return to.
    NoDocksNearDestination,
}

impl fmt::Display for NoRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoRoute::AddressUnresolved {
                origin: Some(o),
                destination: Some(d),
            } => write!(
                f,
                "Could not find the origin address \"{o}\" nor the destination address \"{d}\"."
            ),
            NoRoute::AddressUnresolved {
                origin: Some(o),
                destination: None,
            } => write!(f, "Could not find the origin address \"{o}\"."),
            NoRoute::AddressUnresolved {
                origin: None,
                destination: Some(d),
            } => write!(f, "Could not find the destination address \"{d}\"."),
            NoRoute::AddressUnresolved {
                origin: None,
                destination: None,
            } => write!(f, "Could not find the addresses."),
            NoRoute::EmptyGraph => write!(f, "The graph has no stations."),
            NoRoute::Disconnected { from, to } => write!(
                f,
                "No route found: stations {from} and {to} are not connected."
            ),
            NoRoute::NoBikesNearOrigin => {
                write!(f, "No station with available bikes near the origin.")
            }
            NoRoute::NoDocksNearDestination => {
                write!(f, "No station with available docks near the destination.")
            }
        }
    }
}

/// Result of a planning request: a route, or the reason there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(Route),
    NotFound(NoRoute),
}

impl RouteOutcome {
    /// Sentinel travel time reported when there is no route.
    pub const NO_ROUTE_MINUTES: i64 = -1;

    /// Rounded travel time, or `-1` when there is no route.
    pub fn minutes(&self) -> i64 {
        match self {
            RouteOutcome::Found(route) => route.minutes(),
            RouteOutcome::NotFound(_) => Self::NO_ROUTE_MINUTES,
        }
    }

    pub fn route(&self) -> Option<&Route> {
        match self {
            RouteOutcome::Found(route) => Some(route),
            RouteOutcome::NotFound(_) => None,
        }
    }

    /// Human-readable explanation when there is no route.
    pub fn message(&self) -> Option<String> {
        match self {
            RouteOutcome::Found(_) => None,
            RouteOutcome::NotFound(reason) => Some(reason.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn sample_route(duration: Duration) -> Route {
        let origin = Coordinate::new(0.0, -0.001);
        let destination = Coordinate::new(0.0, 0.011);
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 0.01);
        Route {
            origin,
            destination,
            access: Some(WalkLeg {
                from: origin,
                to: a,
                distance: 111.0,
            }),
            stations: vec![id("1"), id("2")],
            ride_path: vec![a, b],
            ride_distance: 1112.0,
            egress: Some(WalkLeg {
                from: b,
                to: destination,
                distance: 111.0,
            }),
            duration,
        }
    }

    #[test]
    fn minutes_round_to_nearest() {
        assert_eq!(sample_route(Duration::seconds(89)).minutes(), 1);
        assert_eq!(sample_route(Duration::seconds(90)).minutes(), 2);
        assert_eq!(sample_route(Duration::seconds(29)).minutes(), 0);
    }

    #[test]
    fn polyline_includes_walking_legs() {
        let route = sample_route(Duration::minutes(10));
        assert_eq!(
            route.coordinates(),
            vec![
                Coordinate::new(0.0, -0.001),
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.0, 0.01),
                Coordinate::new(0.0, 0.011),
            ]
        );
        assert_eq!(route.walking_distance(), 222.0);
        assert_eq!(route.first_station(), Some(&id("1")));
        assert_eq!(route.last_station(), Some(&id("2")));
    }

    #[test]
    fn outcome_sentinel() {
        let found = RouteOutcome::Found(sample_route(Duration::minutes(12)));
        assert_eq!(found.minutes(), 12);
        assert!(found.message().is_none());

        let missing = RouteOutcome::NotFound(NoRoute::EmptyGraph);
        assert_eq!(missing.minutes(), -1);
        assert!(missing.route().is_none());
        assert_eq!(missing.message().unwrap(), "The graph has no stations.");
    }

    #[test]
    fn unresolved_messages_name_the_address() {
        let origin_only = NoRoute::AddressUnresolved {
            origin: Some("Nowhere 1".into()),
            destination: None,
        };
        assert_eq!(
            origin_only.to_string(),
            "Could not find the origin address \"Nowhere 1\"."
        );

        let dest_only = NoRoute::AddressUnresolved {
            origin: None,
            destination: Some("Nowhere 2".into()),
        };
        assert!(dest_only.to_string().contains("destination address \"Nowhere 2\""));

        let both = NoRoute::AddressUnresolved {
            origin: Some("X".into()),
            destination: Some("Y".into()),
        };
        assert!(both.to_string().contains("\"X\""));
        assert!(both.to_string().contains("\"Y\""));
    }

    #[test]
    fn availability_messages_differ() {
        assert_ne!(
            NoRoute::NoBikesNearOrigin.to_string(),
            NoRoute::NoDocksNearDestination.to_string()
        );
    }
}
