//! Vendor list refresh scheduler
//!
//! [`VendorListManager`] periodically downloads the vendor list, optionally
//! overlays the localized document, and reports each cycle to its listener.
//!
//! # Cycle
//!
//! ```text
//!  start / timer ──► evaluate ──► due? ──no──► arm(remaining)
//!                                  │yes
//!                                  ▼
//!                      in flight? ──yes──► no-op
//!                                  │no
//!                                  ▼
//!                           fetch primary ──err──► on_failure, arm(retry)
//!                                  │ok
//!                                  ▼
//!              record success, arm(refresh), fetch localized
//!                                  │ ok / err (degrades)
//!                                  ▼
//!                               on_success
//! ```
//!
//! State lives in one mutex-guarded [`SchedulerState`]. Background tasks hold
//! a `Weak` reference to the scheduler and tag their work with the epoch it
//! was issued under, so callbacks from before a stop are discarded.

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;

use super::document::VendorList;
use super::endpoint::Endpoint;
use super::fetcher::{DocumentFetcher, HttpFetcher};
use super::listener::VendorListListener;
use super::state::{SchedulerState, SchedulerStatus, TimerHandle};
use crate::config::RefreshConfig;
use crate::error::{Error, Result};

/// Periodically refreshes the vendor list
pub struct VendorListManager {
    inner: Arc<Inner>,
}

struct Inner {
    endpoint: Endpoint,
    retry_interval: Duration,
    fetcher: Arc<dyn DocumentFetcher>,
    listener: Arc<dyn VendorListListener>,
    runtime: Handle,
    state: Mutex<SchedulerState>,
}

impl VendorListManager {
    /// Create a scheduler
    ///
    /// Must be called from within a tokio runtime; timers and fetches are
    /// spawned onto it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the configured version is below
    /// 1, or [`Error::Config`] outside a tokio runtime.
    pub fn new(
        config: RefreshConfig,
        fetcher: Arc<dyn DocumentFetcher>,
        listener: Arc<dyn VendorListListener>,
    ) -> Result<Self> {
        let endpoint = Endpoint::resolve(
            config.version,
            config.language.as_ref(),
            config.override_url.as_ref(),
        )?;
        let runtime = Handle::try_current()
            .map_err(|e| Error::config(format!("VendorListManager needs a tokio runtime: {e}")))?;

        tracing::debug!(
            primary = endpoint.primary(),
            localized = ?endpoint.localized(),
            "Vendor list endpoints resolved"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                endpoint,
                retry_interval: config.retry_interval,
                fetcher,
                listener,
                runtime,
                state: Mutex::new(SchedulerState::new(config.refresh_interval)),
            }),
        })
    }

    /// Create a scheduler backed by the default [`HttpFetcher`]
    pub fn with_http(
        config: RefreshConfig,
        listener: Arc<dyn VendorListListener>,
    ) -> Result<Self> {
        let fetcher = HttpFetcher::new()?;
        Self::new(config, Arc::new(fetcher), listener)
    }

    /// Resolved endpoints
    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    /// Interval between successful refreshes
    pub fn refresh_interval(&self) -> Duration {
        self.inner.lock().refresh_interval
    }

    /// Change the refresh interval; applies from the next evaluation
    pub fn set_refresh_interval(&self, interval: Duration) {
        self.inner.lock().refresh_interval = interval;
    }

    /// Interval before the next check after a failure
    pub fn retry_interval(&self) -> Duration {
        self.inner.retry_interval
    }

    /// Enable automatic refresh
    ///
    /// With `force_first_refresh` the last success is forgotten so the list is
    /// downloaded right away. Otherwise a refresh happens now only if the
    /// refresh interval has elapsed since the last success.
    pub fn start_automatic_refresh(&self, force_first_refresh: bool) {
        let mut state = self.inner.lock();
        state.automatic = true;
        state.stopped = false;
        if force_first_refresh {
            state.last_success = None;
        }
        tracing::info!(force_first_refresh, "Automatic vendor list refresh started");
        Inner::evaluate(&self.inner, &mut state);
    }

    /// Disable automatic refresh
    ///
    /// Cancels the pending check and releases the in-flight guard. A download
    /// already handed to the fetcher keeps running, but its outcome is
    /// discarded.
    pub fn stop_automatic_refresh(&self) {
        self.inner.lock().stop();
        tracing::info!("Automatic vendor list refresh stopped");
    }

    /// Pull the next check forward to one retry interval from now
    ///
    /// Does nothing unless automatic refresh is enabled. An in-flight
    /// download is left alone.
    pub fn reset_timer(&self) {
        let mut state = self.inner.lock();
        if !state.automatic {
            tracing::debug!("Timer reset ignored, automatic refresh is not enabled");
            return;
        }
        Inner::arm(&self.inner, &mut state, self.inner.retry_interval);
    }

    /// Start a refresh cycle now unless one is already in flight
    pub fn refresh_vendor_list(&self) {
        let mut state = self.inner.lock();
        Inner::begin_refresh(&self.inner, &mut state);
    }

    /// Fetch a specific vendor list version once and report it to `listener`
    ///
    /// Runs independently of the automatic refresh: it is not de-duplicated
    /// and does not touch the last success or the timer. The request keeps
    /// its own handle on the fetcher, so it still reports to `listener` if
    /// the manager is dropped or stopped first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `version` is below 1.
    pub fn get_vendor_list(
        &self,
        version: i64,
        listener: Arc<dyn VendorListListener>,
    ) -> Result<()> {
        let endpoint = Endpoint::resolve(Some(version), None, None)?;
        let fetcher = Arc::clone(&self.inner.fetcher);

        self.inner.runtime.spawn(async move {
            match fetch_primary(fetcher.as_ref(), endpoint.primary()).await {
                Ok(vendor_list) => listener.on_success(vendor_list),
                Err(err) => {
                    tracing::warn!(version, error = %err, "One-shot vendor list fetch failed");
                    listener.on_failure(err)
                }
            }
        });

        Ok(())
    }

    /// Fetch a specific vendor list version once
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a version below 1,
    /// [`Error::Network`] if the download fails, or
    /// [`Error::MergeConstruction`] if the document is not a JSON object.
    pub async fn fetch_vendor_list(&self, version: i64) -> Result<VendorList> {
        let endpoint = Endpoint::resolve(Some(version), None, None)?;
        fetch_primary(self.inner.fetcher.as_ref(), endpoint.primary()).await
    }

    /// Current scheduler status
    pub fn status(&self) -> SchedulerStatus {
        self.inner
            .lock()
            .snapshot(Instant::now(), self.inner.retry_interval)
    }
}

impl Drop for VendorListManager {
    fn drop(&mut self) {
        self.inner.lock().stop();
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Refresh now if due, otherwise arm a check for when it will be
    fn evaluate(this: &Arc<Self>, state: &mut SchedulerState) {
        state.cancel_timer();
        let remaining = state.remaining(Instant::now());
        if remaining.is_zero() {
            Self::begin_refresh(this, state);
        } else {
            Self::arm(this, state, remaining);
        }
    }

    /// Replace the pending check with one firing after `delay`
    fn arm(this: &Arc<Self>, state: &mut SchedulerState, delay: Duration) {
        state.cancel_timer();

        let id = state.next_timer_id();
        let deadline = Instant::now() + delay;
        let weak = Arc::downgrade(this);
        let task = this.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let mut state = inner.lock();
            if !state.owns_timer(id) {
                tracing::debug!(timer = id, "Superseded timer fired, ignoring");
                return;
            }
            state.timer = None;
            tracing::debug!(timer = id, "Vendor list check timer fired");
            Self::evaluate(&inner, &mut state);
        });

        tracing::debug!(timer = id, delay_ms = delay.as_millis() as u64, "Next vendor list check armed");
        state.timer = Some(TimerHandle { id, deadline, task });
    }

    /// Arm a check only while automatic refresh is enabled
    fn schedule_if_active(this: &Arc<Self>, state: &mut SchedulerState, delay: Duration) {
        if state.automatic {
            Self::arm(this, state, delay);
        }
    }

    /// Issue a refresh cycle unless one is already in flight
    fn begin_refresh(this: &Arc<Self>, state: &mut SchedulerState) -> bool {
        let Some(epoch) = state.begin_cycle() else {
            tracing::debug!("Vendor list download already in flight, skipping refresh");
            return false;
        };

        let weak = Arc::downgrade(this);
        this.runtime.spawn(Self::run_cycle(weak, epoch));
        true
    }

    async fn run_cycle(weak: Weak<Self>, epoch: u64) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let fetcher = Arc::clone(&inner.fetcher);
        let endpoint = inner.endpoint.clone();
        drop(inner);

        tracing::info!(url = endpoint.primary(), "Refreshing vendor list");
        let primary = fetcher.fetch(endpoint.primary()).await;

        let Some(inner) = weak.upgrade() else {
            return;
        };
        let vendor_list = match primary.map_err(Error::from).and_then(VendorList::new) {
            Ok(vendor_list) => vendor_list,
            Err(err) => {
                Self::complete_with_failure(&inner, epoch, err);
                return;
            }
        };

        {
            let mut state = inner.lock();
            if !state.is_current(epoch) {
                tracing::debug!(epoch, "Discarding vendor list from a stopped refresh");
                return;
            }
            state.record_success(Instant::now(), Utc::now());
            let interval = state.refresh_interval;
            Self::schedule_if_active(&inner, &mut state, interval);
        }

        let Some(localized_url) = endpoint.localized() else {
            Self::complete_with_success(&inner, epoch, vendor_list);
            return;
        };
        drop(inner);

        let localized = fetcher.fetch(localized_url).await;

        let Some(inner) = weak.upgrade() else {
            return;
        };
        let vendor_list = match localized {
            Ok(document) => vendor_list.with_localized(document),
            Err(err) => {
                tracing::warn!(
                    url = localized_url,
                    error = %err,
                    "Localized vendor list unavailable, using primary only"
                );
                vendor_list
            }
        };
        Self::complete_with_success(&inner, epoch, vendor_list);
    }

    fn complete_with_success(this: &Arc<Self>, epoch: u64, vendor_list: VendorList) {
        {
            let mut state = this.lock();
            if !state.is_current(epoch) {
                tracing::debug!(epoch, "Discarding vendor list from a stopped refresh");
                return;
            }
            state.download_in_flight = false;
            // The refresh timer may have fired while the localized fetch was
            // pending and found the guard held; pick the check back up here.
            if state.automatic && state.timer.is_none() {
                Self::evaluate(this, &mut state);
            }
        }

        tracing::info!(
            version = ?vendor_list.version(),
            localized = vendor_list.is_localized(),
            "Vendor list updated"
        );
        this.listener.on_success(vendor_list);
    }

    fn complete_with_failure(this: &Arc<Self>, epoch: u64, err: Error) {
        {
            let mut state = this.lock();
            if !state.is_current(epoch) {
                tracing::debug!(epoch, error = %err, "Discarding failure from a stopped refresh");
                return;
            }
            state.download_in_flight = false;
            Self::schedule_if_active(this, &mut state, this.retry_interval);
        }

        tracing::warn!(
            error = %err,
            recoverable = err.is_recoverable(),
            retry_in_ms = this.retry_interval.as_millis() as u64,
            "Vendor list refresh failed"
        );
        this.listener.on_failure(err);
    }
}

async fn fetch_primary(fetcher: &dyn DocumentFetcher, url: &str) -> Result<VendorList> {
    let document = fetcher.fetch(url).await?;
    VendorList::new(document)
}
