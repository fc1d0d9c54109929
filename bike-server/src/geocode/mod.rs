//! Address to coordinate resolution.
//!
//! The planner only needs `address -> coordinate | not found`. The live
//! implementation queries Nominatim behind a cache; a static gazetteer
//! loaded from JSON serves offline development and tests.

mod cache;
mod client;
mod error;

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use crate::domain::Coordinate;

pub use cache::{CachedGeocoder, GeocodeCacheConfig};
pub use client::{GeocoderConfig, NominatimClient, SearchHit, parse_hits};
pub use error::GeocodeError;

/// Trait for resolving free-text addresses.
///
/// This abstraction allows the planner to be tested with fixed data.
pub trait Geocoder {
    /// Resolve `address` to a coordinate.
    ///
    /// Returns `Ok(None)` when the address matches nothing; `Err` is
    /// reserved for failures of the geocoding service itself.
    fn resolve(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Option<Coordinate>, GeocodeError>> + Send;
}

/// Canonical form of an address for lookups: trimmed, lower-cased and
/// with runs of whitespace collapsed.
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Geocoder backed by a fixed address table.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, Coordinate>,
}

impl StaticGeocoder {
    /// Create an empty gazetteer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a place.
    pub fn with(mut self, address: &str, coordinate: Coordinate) -> Self {
        self.places.insert(normalize_address(address), coordinate);
        self
    }

    /// Load a gazetteer from a JSON object mapping addresses to
    /// `{"lat": .., "lon": ..}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GeocodeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse a gazetteer from JSON text.
    pub fn from_json(json: &str) -> Result<Self, GeocodeError> {
        let raw: HashMap<String, Coordinate> =
            serde_json::from_str(json).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
            })?;

        let mut places = HashMap::with_capacity(raw.len());
        for (address, coordinate) in raw {
            if !coordinate.is_valid() {
                return Err(GeocodeError::InvalidCoordinate(address));
            }
            places.insert(normalize_address(&address), coordinate);
        }
        Ok(Self { places })
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl Geocoder for StaticGeocoder {
    async fn resolve(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Ok(self.places.get(&normalize_address(address)).copied())
    }
}

/// The geocoder selected at startup.
pub enum GeocoderSource {
    Nominatim(CachedGeocoder<NominatimClient>),
    Static(StaticGeocoder),
}

impl Geocoder for GeocoderSource {
    async fn resolve(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        match self {
            GeocoderSource::Nominatim(geocoder) => geocoder.resolve(address).await,
            GeocoderSource::Static(geocoder) => geocoder.resolve(address).await,
        }
    }
}
