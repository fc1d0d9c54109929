//! Offline inventory read from saved GBFS documents.
//!
//! Useful for development without network access, and for replaying a
//! known network state.

use std::path::PathBuf;

use tracing::info;

use super::InventoryFeed;
use super::convert::join_feeds;
use super::error::FeedError;
use super::types::{StationInformation, StationStatus, parse_stations};
use crate::domain::Station;

/// Feed backed by `station_information.json` and `station_status.json`
/// in a directory.
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    dir: PathBuf,
}

impl SnapshotFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn read(&self, feed: &str) -> Result<String, FeedError> {
        let path = self.dir.join(format!("{feed}.json"));
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FeedError::Io { path, source })
    }
}

impl InventoryFeed for SnapshotFeed {
    async fn fetch(&self) -> Result<Vec<Station>, FeedError> {
        let information: Vec<StationInformation> =
            parse_stations(&self.read("station_information").await?)?;
        let status: Vec<StationStatus> = parse_stations(&self.read("station_status").await?)?;

        let stations = join_feeds(information, status);
        info!(
            dir = %self.dir.display(),
            stations = stations.len(),
            "Loaded station snapshot"
        );
        Ok(stations)
    }
}
