//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Inventory, Station};
use crate::gbfs::FeedSource;
use crate::geocode::GeocoderSource;
use crate::graph::{GraphConfig, PositionIndex, StationGraph};
use crate::planner::RouteConfig;

/// The graph built by the last `POST /graph`, with the snapshot it was
/// built from. Never mutated once built.
#[derive(Debug)]
pub struct Session {
    pub graph: StationGraph,
    pub positions: PositionIndex,
    pub stations: Vec<Station>,
    pub inventory: Inventory,
    pub max_distance: f64,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Where station snapshots come from
    pub feed: Arc<FeedSource>,

    /// Address lookup
    pub geocoder: Arc<GeocoderSource>,

    /// Threshold used when `POST /graph` names none
    pub graph_config: Arc<GraphConfig>,

    /// Walking and riding speeds
    pub config: Arc<RouteConfig>,

    session: Arc<RwLock<Option<Arc<Session>>>>,
}

impl AppState {
    /// Create a new app state with no graph built yet.
    pub fn new(
        feed: FeedSource,
        geocoder: GeocoderSource,
        graph_config: GraphConfig,
        config: RouteConfig,
    ) -> Self {
        Self {
            feed: Arc::new(feed),
            geocoder: Arc::new(geocoder),
            graph_config: Arc::new(graph_config),
            config: Arc::new(config),
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// The current graph session, if one has been built.
    pub async fn session(&self) -> Option<Arc<Session>> {
        self.session.read().await.clone()
    }

    /// Replace the current session.
    ///
    /// Requests already holding the previous session finish with it.
    pub async fn replace_session(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        *self.session.write().await = Some(Arc::clone(&session));
        session
    }
}
