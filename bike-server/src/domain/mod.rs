//! Domain types for the bike-share planner.
//!
//! Stations, coordinates and availability snapshots. Types check their
//! invariants at construction time, so code that receives them can
//! trust their validity.

mod coordinate;
mod error;
mod inventory;
mod station;

pub use coordinate::Coordinate;
pub use error::DomainError;
pub use inventory::{Availability, Inventory};
pub use station::{InvalidStationId, Station, StationId};
