//! Travel speed configuration for the route planner.

use chrono::Duration;

use super::router::PlanError;

/// Configuration parameters for route timing.
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// Walking speed on access and egress legs (km/h).
    pub walking_speed_kmh: f64,

    /// Riding speed between stations (km/h).
    pub biking_speed_kmh: f64,
}

impl RouteConfig {
    /// Create a new configuration with the given speeds.
    ///
    /// Both speeds must be positive finite numbers.
    pub fn new(walking_speed_kmh: f64, biking_speed_kmh: f64) -> Result<Self, PlanError> {
        for (name, speed) in [("walking", walking_speed_kmh), ("biking", biking_speed_kmh)] {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(PlanError::InvalidParameter(format!(
                    "{name} speed must be positive, got {speed}"
                )));
            }
        }

        Ok(Self {
            walking_speed_kmh,
            biking_speed_kmh,
        })
    }

    /// Time to walk `metres`.
    pub fn walking_time(&self, metres: f64) -> Duration {
        travel_time(metres, self.walking_speed_kmh)
    }

    /// Time to ride `metres`.
    pub fn biking_time(&self, metres: f64) -> Duration {
        travel_time(metres, self.biking_speed_kmh)
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            walking_speed_kmh: 4.0,
            biking_speed_kmh: 10.0,
        }
    }
}

fn travel_time(metres: f64, speed_kmh: f64) -> Duration {
    let seconds = metres / (speed_kmh * 1000.0 / 3600.0);
    Duration::milliseconds((seconds * 1000.0).round() as i64)
}
