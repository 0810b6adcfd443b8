//! Refresh scheduler state
//!
//! All fields are mutated under the manager's lock only. Critical sections
//! never await, so the lock is a plain `std::sync::Mutex`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::utils::format_duration;

/// Lifecycle of the automatic refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshState {
    /// Never started: no timer, no download
    Idle,
    /// Timer pending, no download
    Armed,
    /// A refresh cycle is in flight
    Fetching,
    /// Automatic refresh was stopped
    Stopped,
}

impl fmt::Display for RefreshState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Armed => "armed",
            Self::Fetching => "fetching",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Pending timer task
pub(crate) struct TimerHandle {
    pub(crate) id: u64,
    pub(crate) deadline: Instant,
    pub(crate) task: JoinHandle<()>,
}

/// Mutable scheduler state
pub(crate) struct SchedulerState {
    /// Monotonic time of the last successful primary fetch
    pub(crate) last_success: Option<Instant>,

    /// Wall-clock time of the last successful primary fetch
    pub(crate) last_success_at: Option<DateTime<Utc>>,

    /// True from issuing the primary fetch until the cycle's terminal callback
    pub(crate) download_in_flight: bool,

    /// Pending check, at most one
    pub(crate) timer: Option<TimerHandle>,

    /// Automatic refresh enabled
    pub(crate) automatic: bool,

    /// Stopped since the last start
    pub(crate) stopped: bool,

    /// Bumped on stop; cycles issued under an older epoch are stale
    pub(crate) epoch: u64,

    pub(crate) refresh_interval: Duration,

    next_timer_id: u64,
}

impl SchedulerState {
    pub(crate) fn new(refresh_interval: Duration) -> Self {
        Self {
            last_success: None,
            last_success_at: None,
            download_in_flight: false,
            timer: None,
            automatic: false,
            stopped: false,
            epoch: 0,
            refresh_interval,
            next_timer_id: 0,
        }
    }

    /// Time left before the next refresh is due, zero if due now
    pub(crate) fn remaining(&self, now: Instant) -> Duration {
        match self.last_success {
            Some(last) => (last + self.refresh_interval).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Claim the in-flight guard, returning the cycle's epoch
    pub(crate) fn begin_cycle(&mut self) -> Option<u64> {
        if self.download_in_flight {
            return None;
        }
        self.download_in_flight = true;
        Some(self.epoch)
    }

    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    pub(crate) fn record_success(&mut self, now: Instant, at: DateTime<Utc>) {
        self.last_success = Some(now);
        self.last_success_at = Some(at);
    }

    pub(crate) fn next_timer_id(&mut self) -> u64 {
        self.next_timer_id += 1;
        self.next_timer_id
    }

    /// Abort the pending timer, if any
    pub(crate) fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.task.abort();
        }
    }

    /// Whether `id` is the currently pending timer
    pub(crate) fn owns_timer(&self, id: u64) -> bool {
        self.timer.as_ref().is_some_and(|timer| timer.id == id)
    }

    pub(crate) fn stop(&mut self) {
        self.cancel_timer();
        self.download_in_flight = false;
        self.automatic = false;
        self.stopped = true;
        self.epoch += 1;
    }

    pub(crate) fn refresh_state(&self) -> RefreshState {
        if self.download_in_flight {
            RefreshState::Fetching
        } else if self.timer.is_some() {
            RefreshState::Armed
        } else if self.stopped {
            RefreshState::Stopped
        } else {
            RefreshState::Idle
        }
    }

    pub(crate) fn snapshot(&self, now: Instant, retry_interval: Duration) -> SchedulerStatus {
        SchedulerStatus {
            state: self.refresh_state(),
            automatic_refresh: self.automatic,
            download_in_flight: self.download_in_flight,
            last_success_at: self.last_success_at,
            next_check_in: self
                .timer
                .as_ref()
                .map(|timer| timer.deadline.saturating_duration_since(now)),
            refresh_interval: self.refresh_interval,
            retry_interval,
        }
    }
}

/// Point-in-time view of a refresh scheduler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerStatus {
    pub state: RefreshState,
    pub automatic_refresh: bool,
    pub download_in_flight: bool,
    pub last_success_at: Option<DateTime<Utc>>,
    pub next_check_in: Option<Duration>,
    pub refresh_interval: Duration,
    pub retry_interval: Duration,
}

impl SchedulerStatus {
    /// Format as display string
    pub fn display(&self) -> String {
        let mut output = String::from("Vendor List Refresh Status\n");
        output.push_str(&format!("{:-<40}\n", ""));
        output.push_str(&format!("State: {}\n", self.state));
        output.push_str(&format!("Automatic Refresh: {}\n", self.automatic_refresh));
        output.push_str(&format!("Download In Flight: {}\n", self.download_in_flight));

        match self.last_success_at {
            Some(at) => output.push_str(&format!("Last Success: {}\n", at.to_rfc3339())),
            None => output.push_str("Last Success: never\n"),
        }

        if let Some(next) = self.next_check_in {
            output.push_str(&format!("Next Check In: {}\n", format_duration(next)));
        }

        output.push_str(&format!(
            "Refresh Interval: {}\n",
            format_duration(self.refresh_interval)
        ));
        output.push_str(&format!(
            "Retry Interval: {}\n",
            format_duration(self.retry_interval)
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_remaining_without_success_is_zero() {
        let state = SchedulerState::new(Duration::from_secs(60));
        assert_eq!(state.remaining(Instant::now()), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_after_success() {
        let mut state = SchedulerState::new(Duration::from_secs(60));
        let start = Instant::now();
        state.record_success(start, Utc::now());

        assert_eq!(state.remaining(start), Duration::from_secs(60));
        assert_eq!(
            state.remaining(start + Duration::from_secs(45)),
            Duration::from_secs(15)
        );
        assert_eq!(
            state.remaining(start + Duration::from_secs(90)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_in_flight_guard() {
        let mut state = SchedulerState::new(Duration::from_secs(60));
        assert_eq!(state.begin_cycle(), Some(0));
        assert_eq!(state.begin_cycle(), None);
        assert_eq!(state.refresh_state(), RefreshState::Fetching);
    }

    #[test]
    fn test_stop_invalidates_cycle() {
        let mut state = SchedulerState::new(Duration::from_secs(60));
        let epoch = state.begin_cycle().unwrap();
        state.stop();

        assert!(!state.is_current(epoch));
        assert!(!state.download_in_flight);
        assert_eq!(state.refresh_state(), RefreshState::Stopped);
        assert_eq!(state.begin_cycle(), Some(epoch + 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_display() {
        let mut state = SchedulerState::new(Duration::from_secs(3600));
        state.automatic = true;
        let status = state.snapshot(Instant::now(), Duration::from_secs(60));

        assert_eq!(status.state, RefreshState::Idle);
        assert_eq!(status.next_check_in, None);
        let text = status.display();
        assert!(text.contains("Last Success: never"));
        assert!(text.contains("Refresh Interval: 1h 0m"));
        assert!(text.contains("Retry Interval: 1m"));
    }
}
