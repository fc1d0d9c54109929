//! Graph construction configuration.

/// Default maximum distance between connected stations, in metres.
pub const DEFAULT_MAX_DISTANCE_M: f64 = 1000.0;

/// Configuration parameters for building the station graph.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Maximum distance (metres) at which two stations are connected.
    pub max_distance: f64,
}

impl GraphConfig {
    /// Create a new configuration with the given threshold.
    pub fn new(max_distance: f64) -> Self {
        Self { max_distance }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE_M,
        }
    }
}
