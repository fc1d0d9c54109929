//! GBFS v2 document DTOs.
//!
//! Only the fields the planner reads are modelled; serde ignores the
//! rest. Operators disagree on whether `station_id` is a string or a
//! number, so both are accepted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::error::FeedError;

/// Envelope shared by every GBFS feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedDocument<T> {
    /// POSIX timestamp of the last update.
    pub last_updated: Option<i64>,

    /// Seconds the document stays fresh.
    pub ttl: Option<u32>,

    pub data: StationList<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationList<T> {
    pub stations: Vec<T>,
}

/// Entry of `station_information`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationInformation {
    #[serde(deserialize_with = "station_id")]
    pub station_id: String,

    pub name: Option<String>,

    /// Street address. Some operators only publish `name`.
    pub address: Option<String>,

    pub lat: f64,
    pub lon: f64,

    /// Number of docks; optional in GBFS.
    pub capacity: Option<u32>,
}

/// Entry of `station_status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationStatus {
    #[serde(deserialize_with = "station_id")]
    pub station_id: String,

    pub num_bikes_available: u32,

    pub num_docks_available: u32,
}

fn station_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Parse a GBFS document and return its station list.
pub fn parse_stations<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, FeedError> {
    let document: FeedDocument<T> = serde_json::from_str(body).map_err(|e| FeedError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })?;
    Ok(document.data.stations)
}
