//! Nominatim (OpenStreetMap) geocoding client.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use super::Geocoder;
use super::error::GeocodeError;
use crate::domain::Coordinate;

/// Default base URL for the public Nominatim instance.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default area appended to every query.
const DEFAULT_AREA: &str = "Barcelona";

/// One search hit. Nominatim encodes coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub lat: String,
    pub lon: String,
    pub display_name: Option<String>,
}

impl SearchHit {
    fn coordinate(&self) -> Result<Coordinate, GeocodeError> {
        let invalid = || GeocodeError::InvalidCoordinate(format!("{}, {}", self.lat, self.lon));
        let lat: f64 = self.lat.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = self.lon.trim().parse().map_err(|_| invalid())?;
        let coordinate = Coordinate::new(lat, lon);
        if !coordinate.is_valid() {
            return Err(invalid());
        }
        Ok(coordinate)
    }
}

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim instance
    pub base_url: String,
    /// User-Agent sent with every request (required by the usage policy)
    pub user_agent: String,
    /// Area appended to queries, e.g. the network's city
    pub area: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeocoderConfig {
    /// Create a config with defaults and the given User-Agent.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: user_agent.into(),
            area: Some(DEFAULT_AREA.to_string()),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing or a self-hosted instance).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the area appended to every query. Blank disables it.
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        let area = area.into();
        self.area = (!area.trim().is_empty()).then_some(area);
        self
    }

    /// Build the free-text query sent for `address`.
    pub fn query_for(&self, address: &str) -> String {
        match &self.area {
            Some(area) => format!("{}, {}", address.trim(), area),
            None => address.trim().to_string(),
        }
    }
}

/// Client for the Nominatim search API.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    config: GeocoderConfig,
}

impl NominatimClient {
    /// Create a new Nominatim client.
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent).map_err(|_| GeocodeError::Api {
            status: 0,
            message: "Invalid User-Agent".to_string(),
        })?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }
}

impl Geocoder for NominatimClient {
    async fn resolve(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        if address.trim().is_empty() {
            return Ok(None);
        }

        let url = format!("{}/search", self.config.base_url);
        let query = self.config.query_for(address);

        let response = self
            .http
            .get(&url)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let hits = parse_hits(&body)?;

        debug!(query = %query, hits = hits.len(), "Geocoded address");

        hits.first().map(SearchHit::coordinate).transpose()
    }
}

/// Parse a Nominatim `format=json` search response.
pub fn parse_hits(body: &str) -> Result<Vec<SearchHit>, GeocodeError> {
    serde_json::from_str(body).map_err(|e| GeocodeError::Json {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = GeocoderConfig::new("bike-server-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.area.as_deref(), Some("Barcelona"));
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn query_appends_area() {
        let config = GeocoderConfig::new("t");
        assert_eq!(
            config.query_for("  Plaça de Catalunya "),
            "Plaça de Catalunya, Barcelona"
        );

        let config = config.with_area("  ");
        assert_eq!(config.query_for("Plaça de Catalunya"), "Plaça de Catalunya");

        let config = config.with_area("Girona");
        assert_eq!(config.query_for("Rambla"), "Rambla, Girona");
    }

    #[test]
    fn parse_search_response() {
        let body = r#"[{"place_id":1,"lat":"41.3870","lon":"2.1700","display_name":"Plaça de Catalunya, Barcelona"}]"#;
        let hits = parse_hits(body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].coordinate().unwrap(), Coordinate::new(41.3870, 2.1700));
    }

    #[test]
    fn parse_empty_response() {
        assert!(parse_hits("[]").unwrap().is_empty());
        assert!(parse_hits("{").is_err());
    }

    #[test]
    fn rejects_garbage_coordinates() {
        let hit = SearchHit {
            lat: "north".into(),
            lon: "2.0".into(),
            display_name: None,
        };
        assert!(matches!(
            hit.coordinate(),
            Err(GeocodeError::InvalidCoordinate(_))
        ));

        let hit = SearchHit {
            lat: "123.0".into(),
            lon: "2.0".into(),
            display_name: None,
        };
        assert!(hit.coordinate().is_err());
    }
}
