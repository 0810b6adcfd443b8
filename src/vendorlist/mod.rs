//! Vendor list refresh
//!
//! # Modules
//!
//! - [`endpoint`] - Maps version, language and override to document URLs
//! - [`fetcher`] - Document fetching capability and its HTTP implementation
//! - [`document`] - Merged vendor list (primary + localized overlay)
//! - [`listener`] - Refresh outcome listeners
//! - [`state`] - Scheduler state and status snapshots
//! - [`manager`] - The refresh scheduler
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use vendorlist::config::RefreshConfig;
//! use vendorlist::vendorlist::{ChannelListener, VendorListEvent, VendorListManager};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RefreshConfig::builder()
//!         .refresh_interval(Duration::from_secs(3600))
//!         .retry_interval(Duration::from_secs(60))
//!         .language("fr")
//!         .build()?;
//!
//!     let (listener, mut events) = ChannelListener::new();
//!     let manager = VendorListManager::with_http(config, Arc::new(listener))?;
//!     manager.start_automatic_refresh(false);
//!
//!     while let Some(event) = events.recv().await {
//!         if let VendorListEvent::Updated(list) = event {
//!             println!("vendor list v{:?}", list.version());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod endpoint;
pub mod fetcher;
pub mod listener;
pub mod manager;
pub mod state;

pub use document::VendorList;
pub use endpoint::Endpoint;
pub use fetcher::{DocumentFetcher, HttpFetcher};
pub use listener::{ChannelListener, FnListener, VendorListEvent, VendorListListener};
pub use manager::VendorListManager;
pub use state::{RefreshState, SchedulerStatus};
