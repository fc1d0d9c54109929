//! Domain error types.
//!
//! These errors represent validation failures in the domain layer.
//! They are distinct from feed and geocoder errors.

use super::StationId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// More bikes and free docks reported than the station can hold
    #[error("station {station}: {bikes} bikes + {docks} docks exceed capacity {capacity}")]
    OverCapacity {
        station: StationId,
        bikes: u32,
        docks: u32,
        capacity: u32,
    },

    /// Coordinate outside the WGS84 range or not a number
    #[error("station {0}: invalid coordinate")]
    InvalidCoordinate(StationId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let station = StationId::parse("12").unwrap();
        let err = DomainError::OverCapacity {
            station: station.clone(),
            bikes: 8,
            docks: 5,
            capacity: 12,
        };
        assert_eq!(
            err.to_string(),
            "station 12: 8 bikes + 5 docks exceed capacity 12"
        );

        let err = DomainError::InvalidCoordinate(station);
        assert_eq!(err.to_string(), "station 12: invalid coordinate");
    }
}
