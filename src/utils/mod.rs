//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use std::time::Duration;

/// Format a duration as a compact human-readable string (`1h 5m`, `42s`, `250ms`)
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms < 1000 {
        return format!("{total_ms}ms");
    }

    let secs = duration.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let rem = secs % 60;

    match (hours, mins) {
        (0, 0) => format!("{rem}s"),
        (0, m) if rem == 0 => format!("{m}m"),
        (0, m) => format!("{m}m {rem}s"),
        (h, m) => format!("{h}h {m}m"),
    }
}
