//! Caching layer for geocoding results.
//!
//! Users tend to ask for the same few places repeatedly, and public
//! geocoders are rate limited. Hits and misses are both cached; errors
//! are not, so a transient failure is retried on the next request.

use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use super::error::GeocodeError;
use super::{Geocoder, normalize_address};
use crate::domain::Coordinate;

/// Configuration for the geocoding cache.
#[derive(Debug, Clone)]
pub struct GeocodeCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached addresses.
    pub max_capacity: u64,
}

impl Default for GeocodeCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Geocoder wrapper that caches results by normalised address.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: MokaCache<String, Option<Coordinate>>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    /// Create a new cached geocoder.
    pub fn new(inner: G, config: &GeocodeCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, cache }
    }
}

impl<G: Geocoder + Sync> Geocoder for CachedGeocoder<G> {
    async fn resolve(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let key = normalize_address(address);

        if let Some(cached) = self.cache.get(&key).await {
            trace!(address = %key, "Geocode cache hit");
            return Ok(cached);
        }

        let resolved = self.inner.resolve(address).await?;
        self.cache.insert(key, resolved).await;
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts lookups and knows a single address.
    struct CountingGeocoder {
        calls: AtomicUsize,
    }

    impl Geocoder for CountingGeocoder {
        async fn resolve(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if normalize_address(address) == "sagrada familia" {
                Ok(Some(Coordinate::new(41.4036, 2.1744)))
            } else {
                Ok(None)
            }
        }
    }

    fn cached() -> CachedGeocoder<CountingGeocoder> {
        CachedGeocoder::new(
            CountingGeocoder {
                calls: AtomicUsize::new(0),
            },
            &GeocodeCacheConfig::default(),
        )
    }

    #[tokio::test]
    async fn repeated_lookups_hit_cache() {
        let geocoder = cached();

        let first = geocoder.resolve("Sagrada Familia").await.unwrap();
        let second = geocoder.resolve("  sagrada   FAMILIA ").await.unwrap();

        assert_eq!(first, Some(Coordinate::new(41.4036, 2.1744)));
        assert_eq!(first, second);
        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn misses_are_cached_too() {
        let geocoder = cached();

        assert_eq!(geocoder.resolve("atlantis").await.unwrap(), None);
        assert_eq!(geocoder.resolve("Atlantis").await.unwrap(), None);
        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_config() {
        let config = GeocodeCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.max_capacity, 10_000);
    }
}
