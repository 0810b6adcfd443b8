//! Vendor list listeners
//!
//! A listener receives exactly one notification per refresh cycle.

use tokio::sync::mpsc;

use super::document::VendorList;
use crate::error::Error;

/// Receives the outcome of vendor list refreshes
pub trait VendorListListener: Send + Sync {
    /// A vendor list was downloaded (possibly without its localized overlay)
    fn on_success(&self, vendor_list: VendorList);

    /// The vendor list could not be downloaded or assembled
    fn on_failure(&self, error: Error);
}

/// Outcome of a refresh, as forwarded by [`ChannelListener`]
#[derive(Debug)]
pub enum VendorListEvent {
    /// Successful refresh
    Updated(VendorList),
    /// Failed refresh
    Failed(Error),
}

impl VendorListEvent {
    /// The vendor list, if this event is a success
    pub fn vendor_list(&self) -> Option<&VendorList> {
        match self {
            Self::Updated(list) => Some(list),
            Self::Failed(_) => None,
        }
    }

    /// The error, if this event is a failure
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Updated(_) => None,
            Self::Failed(err) => Some(err),
        }
    }
}

/// Forwards notifications into an unbounded tokio channel
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<VendorListEvent>,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<VendorListEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl VendorListListener for ChannelListener {
    fn on_success(&self, vendor_list: VendorList) {
        if self.sender.send(VendorListEvent::Updated(vendor_list)).is_err() {
            tracing::debug!("Vendor list receiver dropped, discarding update");
        }
    }

    fn on_failure(&self, error: Error) {
        if self.sender.send(VendorListEvent::Failed(error)).is_err() {
            tracing::debug!("Vendor list receiver dropped, discarding failure");
        }
    }
}

/// Listener built from two closures
pub struct FnListener<S, F> {
    on_success: S,
    on_failure: F,
}

impl<S, F> FnListener<S, F>
where
    S: Fn(VendorList) + Send + Sync,
    F: Fn(Error) + Send + Sync,
{
    /// Create a listener from success and failure callbacks
    pub fn new(on_success: S, on_failure: F) -> Self {
        Self {
            on_success,
            on_failure,
        }
    }
}

impl<S, F> VendorListListener for FnListener<S, F>
where
    S: Fn(VendorList) + Send + Sync,
    F: Fn(Error) + Send + Sync,
{
    fn on_success(&self, vendor_list: VendorList) {
        (self.on_success)(vendor_list)
    }

    fn on_failure(&self, error: Error) {
        (self.on_failure)(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_channel_listener_forwards() {
        let (listener, mut receiver) = ChannelListener::new();
        listener.on_success(VendorList::new(json!({ "vendorListVersion": 1 })).unwrap());
        listener.on_failure(Error::Network(FetchError::Timeout));

        let first = receiver.try_recv().unwrap();
        assert_eq!(first.vendor_list().and_then(VendorList::version), Some(1));
        let second = receiver.try_recv().unwrap();
        assert!(matches!(second.error(), Some(Error::Network(_))));
    }

    #[test]
    fn test_channel_listener_survives_dropped_receiver() {
        let (listener, receiver) = ChannelListener::new();
        drop(receiver);
        listener.on_failure(Error::Network(FetchError::Timeout));
    }

    #[test]
    fn test_fn_listener() {
        let successes = AtomicUsize::new(0);
        let failures = AtomicUsize::new(0);
        let listener = FnListener::new(
            |_| {
                successes.fetch_add(1, Ordering::SeqCst);
            },
            |_| {
                failures.fetch_add(1, Ordering::SeqCst);
            },
        );

        listener.on_success(VendorList::new(json!({})).unwrap());
        listener.on_failure(Error::config("boom"));
        listener.on_failure(Error::config("boom"));

        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(failures.load(Ordering::SeqCst), 2);
    }
}
