//! Inventory feed error types.

use std::fmt;
use std::path::PathBuf;

/// Errors from fetching or reading station inventory.
#[derive(Debug)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// Feed returned an error status code
    Api { status: u16, message: String },

    /// Feed document is not valid GBFS JSON
    Json {
        message: String,
        body: Option<String>,
    },

    /// Failed to read a snapshot file
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Http(e) => write!(f, "HTTP error: {e}"),
            FeedError::Api { status, message } => write!(f, "API error {status}: {message}"),
            FeedError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            FeedError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::Http(e) => Some(e),
            FeedError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FeedError::Api {
            status: 503,
            message: "maintenance".into(),
        };
        assert_eq!(err.to_string(), "API error 503: maintenance");

        let err = FeedError::Json {
            message: "missing field `data`".into(),
            body: Some("{}".into()),
        };
        assert_eq!(
            err.to_string(),
            "JSON parse error: missing field `data` (body: {})"
        );

        let err = FeedError::Io {
            path: PathBuf::from("/data/station_status.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().starts_with("failed to read /data/station_status.json"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
