//! Station identifiers and station records.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;
use super::error::DomainError;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// Identifier of a docking station, as published by the feed.
///
/// Feeds use either integer or free-text ids. Ordering is numeric when
/// both ids are integers, so `"9" < "10"`; integer ids sort before
/// non-integer ones, and non-integer ids compare as strings. This order
/// is used for every deterministic tie-break in the planner.
///
/// # Examples
///
/// ```
/// use bike_server::domain::StationId;
///
/// let a = StationId::parse("9").unwrap();
/// let b = StationId::parse("10").unwrap();
/// assert!(a < b);
///
/// // Surrounding whitespace is trimmed, blank ids are rejected
/// assert_eq!(StationId::parse(" 42 ").unwrap().as_str(), "42");
/// assert!(StationId::parse("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Parse a station id. Leading and trailing whitespace is removed.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }
        Ok(StationId(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for StationId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for StationId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<String> for StationId {
    type Error = InvalidStationId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StationId::parse(&value)
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A docking station with its position and current availability.
///
/// `bikes_available + docks_available` never exceeds `capacity`; the
/// difference (if any) is docks that are disabled or reserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub address: String,
    pub coordinate: Coordinate,
    pub capacity: u32,
    pub bikes_available: u32,
    pub docks_available: u32,
}

impl Station {
    /// Create a station, checking the availability invariant.
    pub fn new(
        id: StationId,
        address: impl Into<String>,
        coordinate: Coordinate,
        capacity: u32,
        bikes_available: u32,
        docks_available: u32,
    ) -> Result<Self, DomainError> {
        if !coordinate.is_valid() {
            return Err(DomainError::InvalidCoordinate(id));
        }

        let occupied = u64::from(bikes_available) + u64::from(docks_available);
        if occupied > u64::from(capacity) {
            return Err(DomainError::OverCapacity {
                station: id,
                bikes: bikes_available,
                docks: docks_available,
                capacity,
            });
        }

        Ok(Self {
            id,
            address: address.into(),
            coordinate,
            capacity,
            bikes_available,
            docks_available,
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Integer ids follow integer order
        #[test]
        fn integer_order(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let ia = StationId::parse(&a.to_string()).unwrap();
            let ib = StationId::parse(&b.to_string()).unwrap();
            prop_assert_eq!(ia.cmp(&ib), a.cmp(&b));
        }

        /// Ord agrees with Eq
        #[test]
        fn ord_consistent_with_eq(a in "[0-9A-Za-z]{1,6}", b in "[0-9A-Za-z]{1,6}") {
            let ia = StationId::parse(&a).unwrap();
            let ib = StationId::parse(&b).unwrap();
            prop_assert_eq!(ia.cmp(&ib) == Ordering::Equal, ia == ib);
        }
    }
}
