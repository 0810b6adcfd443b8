//! Unified error handling for the vendorlist crate
//!
//! Every failure the refresh scheduler can surface is an [`Error`]. Listeners
//! receive it through `on_failure`; constructors return it directly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vendorlist::error::{Error, ErrorCategory};
//!
//! fn handle_error(err: &Error) {
//!     if err.is_recoverable() {
//!         println!("Will retry: {err}");
//!     } else {
//!         eprintln!("Fatal error: {err}");
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::utils::error::FetchError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, bad status)
    Network,
    /// Document assembly errors
    Parsing,
    /// Configuration and validation errors
    Config,
}

impl ErrorCategory {
    /// Short label for log lines and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Config => "config",
        }
    }
}

/// Unified error type for the vendorlist crate
#[derive(Error, Debug)]
pub enum Error {
    /// Bad version number or language code. Fatal to construction, never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Primary document could not be fetched
    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    /// Merged document could not be assembled from a fetched primary document
    #[error("Merge construction error: {0}")]
    MergeConstruction(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a merge construction error
    pub fn merge_construction(msg: impl Into<String>) -> Self {
        Self::MergeConstruction(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is recoverable (a later refresh cycle may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(err) => err.is_recoverable(),
            Self::MergeConstruction(_) => true,
            Self::InvalidArgument(_) | Self::Config(_) => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::Network,
            Self::MergeConstruction(_) => ErrorCategory::Parsing,
            Self::InvalidArgument(_) | Self::Config(_) => ErrorCategory::Config,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
