//! Timeout configuration for fetch operations.

use std::time::Duration;

/// Timeout configuration for a fetch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection timeout.
    pub connect: Duration,
    /// Total operation timeout, including reading the body.
    pub total: Duration,
}

impl TimeoutConfig {
    /// Create a new timeout configuration.
    pub fn new(connect: Duration, total: Duration) -> Self {
        Self { connect, total }
    }

    /// Create from a single total timeout.
    ///
    /// The connect phase gets a quarter of the budget.
    pub fn from_total(total: Duration) -> Self {
        Self {
            connect: total / 4,
            total,
        }
    }

    /// Create from a total timeout in milliseconds.
    pub fn from_millis(total_ms: u64) -> Self {
        Self::from_total(Duration::from_millis(total_ms))
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_total(Duration::from_secs(10))
    }
}
