//! GBFS HTTP client.

use serde::de::DeserializeOwned;
use tracing::info;

use super::InventoryFeed;
use super::convert::join_feeds;
use super::error::FeedError;
use super::types::{StationInformation, StationStatus, parse_stations};
use crate::domain::Station;

/// Default feed: Barcelona's Bicing system.
const DEFAULT_BASE_URL: &str = "https://api.bsmsa.eu/ext/api/bsm/gbfs/v2/en";

/// Configuration for the GBFS client.
#[derive(Debug, Clone)]
pub struct GbfsConfig {
    /// Base URL the feed names are appended to
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GbfsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl GbfsConfig {
    /// Set a custom base URL (another operator, or a test server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// URL of one feed document.
    pub fn feed_url(&self, feed: &str) -> String {
        format!("{}/{}", self.base_url, feed)
    }
}

/// Client for a live GBFS v2 system.
#[derive(Debug, Clone)]
pub struct GbfsClient {
    http: reqwest::Client,
    config: GbfsConfig,
}

impl GbfsClient {
    pub fn new(config: GbfsConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    async fn fetch_feed<T: DeserializeOwned>(&self, feed: &str) -> Result<Vec<T>, FeedError> {
        let response = self.http.get(self.config.feed_url(feed)).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_stations(&body)
    }
}

impl InventoryFeed for GbfsClient {
    async fn fetch(&self) -> Result<Vec<Station>, FeedError> {
        let (information, status) = futures::try_join!(
            self.fetch_feed::<StationInformation>("station_information"),
            self.fetch_feed::<StationStatus>("station_status"),
        )?;

        let stations = join_feeds(information, status);
        info!(
            url = %self.config.base_url,
            stations = stations.len(),
            "Fetched station inventory"
        );
        Ok(stations)
    }
}
