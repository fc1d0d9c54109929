//! Station inventory from GBFS feeds.
//!
//! GBFS splits a system into several documents; the planner needs two:
//! - `station_information`: id, address, position and capacity, which
//!   rarely change
//! - `station_status`: bikes and free docks right now
//!
//! Both are fetched together and joined into [`Station`] records, either
//! from a live system or from files saved on disk.

mod client;
mod convert;
mod error;
mod snapshot;
mod types;

use std::future::Future;

use crate::domain::Station;

pub use client::{GbfsClient, GbfsConfig};
pub use convert::join_feeds;
pub use error::FeedError;
pub use snapshot::SnapshotFeed;
pub use types::{FeedDocument, StationInformation, StationList, StationStatus, parse_stations};

/// Source of a consistent station snapshot.
pub trait InventoryFeed {
    /// Fetch every station with its current availability.
    fn fetch(&self) -> impl Future<Output = Result<Vec<Station>, FeedError>> + Send;
}

/// The inventory source selected at startup.
#[derive(Debug, Clone)]
pub enum FeedSource {
    Live(GbfsClient),
    Snapshot(SnapshotFeed),
}

impl InventoryFeed for FeedSource {
    async fn fetch(&self) -> Result<Vec<Station>, FeedError> {
        match self {
            FeedSource::Live(client) => client.fetch().await,
            FeedSource::Snapshot(feed) => feed.fetch().await,
        }
    }
}
