//! Geocoder error types.

/// Errors that can occur while resolving an address.
///
/// An address that simply matches nothing is not an error; resolvers
/// return `Ok(None)` for that.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Response contained a coordinate that is not a valid position
    #[error("invalid coordinate in response: {0}")]
    InvalidCoordinate(String),

    /// Failed to read a local gazetteer file
    #[error("failed to read gazetteer: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = GeocodeError::Api {
            status: 429,
            message: "slow down".into(),
        };
        assert_eq!(err.to_string(), "API error 429: slow down");

        let err = GeocodeError::InvalidCoordinate("lat=abc".into());
        assert_eq!(err.to_string(), "invalid coordinate in response: lat=abc");
    }
}
