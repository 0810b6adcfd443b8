//! Error types for the fetch layer
//!
//! The fetcher reports what went wrong with a single request. It never
//! retries; retry cadence belongs to the refresh scheduler.

use thiserror::Error;

/// Errors that can occur while fetching a vendor list document
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Body could not be decoded as a JSON document
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Check if a later attempt against the same resource could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 408 | 429 | 500..=599),
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_recoverability() {
        assert!(FetchError::ServerError(503).is_recoverable());
        assert!(FetchError::ServerError(429).is_recoverable());
        assert!(!FetchError::ServerError(404).is_recoverable());
    }

    #[test]
    fn test_display() {
        assert_eq!(FetchError::ServerError(500).to_string(), "Server error: 500");
        assert_eq!(
            FetchError::InvalidUrl("nope".into()).to_string(),
            "Invalid URL: nope"
        );
    }
}
