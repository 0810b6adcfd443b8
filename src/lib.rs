//! vendorlist - Vendor list refresh scheduler
//!
//! Periodically downloads a vendor list document, overlays an optional
//! localized translation, and hands the result to a listener. Failures are
//! retried on a shorter cadence and overlapping downloads are suppressed.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Scheduler and application configuration
//! - [`vendorlist`] - Endpoint resolution, fetching, merging and scheduling
//! - [`models`] - Core data types (language codes)
//! - [`error`] - Unified error type
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vendorlist::config::Config;
//! use vendorlist::error::Error;
//! use vendorlist::vendorlist::{FnListener, VendorList, VendorListManager};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let listener = FnListener::new(
//!         |list: VendorList| println!("updated: {:?}", list.version()),
//!         |err: Error| eprintln!("failed: {err}"),
//!     );
//!     let manager = VendorListManager::with_http(config.refresh_config()?, Arc::new(listener))?;
//!     manager.start_automatic_refresh(true);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod utils;
pub mod vendorlist;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, RefreshConfig};
    pub use crate::error::{Error, ErrorCategory, FetchError, Result};
    pub use crate::models::Language;
    pub use crate::vendorlist::{
        ChannelListener, DocumentFetcher, Endpoint, HttpFetcher, VendorList, VendorListEvent,
        VendorListListener, VendorListManager,
    };
}

// Direct re-exports for convenience
pub use models::Language;
pub use vendorlist::{VendorList, VendorListManager};
