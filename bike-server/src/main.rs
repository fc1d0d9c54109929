use std::error::Error;
use std::net::SocketAddr;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bike_server::gbfs::{FeedSource, GbfsClient, GbfsConfig, SnapshotFeed};
use bike_server::geocode::{
    CachedGeocoder, GeocodeCacheConfig, GeocoderConfig, GeocoderSource, NominatimClient,
    StaticGeocoder,
};
use bike_server::graph::GraphConfig;
use bike_server::planner::RouteConfig;
use bike_server::web::{AppState, create_router};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Sent to Nominatim, whose usage policy requires an identifying agent.
const USER_AGENT: &str = concat!("bike-server/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let feed = match env("BIKE_SNAPSHOT_DIR") {
        Some(dir) => {
            info!(%dir, "Using station snapshot");
            FeedSource::Snapshot(SnapshotFeed::new(dir))
        }
        None => {
            let mut config = GbfsConfig::default();
            if let Some(url) = env("BIKE_GBFS_URL") {
                config = config.with_base_url(url);
            }
            info!(url = %config.base_url, "Using live GBFS feed");
            FeedSource::Live(GbfsClient::new(config)?)
        }
    };

    let geocoder = match env("BIKE_GAZETTEER") {
        Some(path) => {
            let gazetteer = StaticGeocoder::from_json_file(&path)?;
            info!(%path, places = gazetteer.len(), "Using static gazetteer");
            GeocoderSource::Static(gazetteer)
        }
        None => {
            let mut config = GeocoderConfig::new(USER_AGENT);
            if let Some(url) = env("GEOCODER_URL") {
                config = config.with_base_url(url);
            }
            if let Some(area) = env("GEOCODER_AREA") {
                config = config.with_area(area);
            }
            info!(url = %config.base_url, area = ?config.area, "Using Nominatim geocoder");
            let client = NominatimClient::new(config)?;
            GeocoderSource::Nominatim(CachedGeocoder::new(client, &GeocodeCacheConfig::default()))
        }
    };

    let graph_config = match env("BIKE_MAX_DISTANCE") {
        Some(d) => GraphConfig::new(parse_positive("BIKE_MAX_DISTANCE", &d)?),
        None => GraphConfig::default(),
    };

    let defaults = RouteConfig::default();
    let walking = match env("BIKE_WALK_KMH") {
        Some(v) => parse_positive("BIKE_WALK_KMH", &v)?,
        None => defaults.walking_speed_kmh,
    };
    let biking = match env("BIKE_BIKE_KMH") {
        Some(v) => parse_positive("BIKE_BIKE_KMH", &v)?,
        None => defaults.biking_speed_kmh,
    };
    let route_config = RouteConfig::new(walking, biking)?;

    let state = AppState::new(feed, geocoder, graph_config, route_config);
    let app = create_router(state);

    let addr: SocketAddr = env("BIKE_BIND_ADDR")
        .as_deref()
        .unwrap_or(DEFAULT_BIND_ADDR)
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Bike planner listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// A non-blank environment variable.
fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_positive(name: &str, value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => {
            warn!(name, value, "Expected a positive number");
            Err(format!("{name} must be a positive number, got {value:?}"))
        }
    }
}
