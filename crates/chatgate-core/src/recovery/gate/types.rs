//! Gate configuration and permit types

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Spacing policy for outbound calls
///
/// The defaults keep a 3-requests-per-minute upstream quota with margin:
/// one dispatch every 25 seconds, plus a 1 second pacing pause after each
/// release so the admitted caller can actually issue its request.
///
/// # Examples
///
/// ```
/// use chatgate_core::recovery::gate::GateConfig;
/// use std::time::Duration;
///
/// let config = GateConfig::default().with_min_interval(Duration::from_secs(5));
/// assert_eq!(config.min_interval, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Minimum spacing between two dispatches
    #[serde(default = "default_min_interval", with = "humantime_serde")]
    pub min_interval: Duration,
    /// Pause after each release before the next waiter is considered
    #[serde(default = "default_pacing_delay", with = "humantime_serde")]
    pub pacing_delay: Duration,
}

fn default_min_interval() -> Duration {
    Duration::from_secs(25)
}

fn default_pacing_delay() -> Duration {
    Duration::from_secs(1)
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_interval: default_min_interval(),
            pacing_delay: default_pacing_delay(),
        }
    }
}

impl GateConfig {
    /// A gate that never waits (useful for local endpoints and tests)
    pub fn unthrottled() -> Self {
        Self {
            min_interval: Duration::ZERO,
            pacing_delay: Duration::ZERO,
        }
    }

    /// Derive the spacing from a requests-per-minute quota
    pub fn for_requests_per_minute(rpm: u32) -> Self {
        let min_interval = if rpm == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(60) / rpm
        };
        Self {
            min_interval,
            ..Default::default()
        }
    }

    /// Set the minimum spacing
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Set the pacing delay
    pub fn with_pacing_delay(mut self, pacing_delay: Duration) -> Self {
        self.pacing_delay = pacing_delay;
        self
    }
}

/// Proof that the caller's dispatch slot has arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPermit {
    /// Arrival order of the `admit()` call, starting at 0
    pub ticket: u64,
    /// When the gate released this caller
    pub dispatched_at: Instant,
    /// How long the caller was queued
    pub waited: Duration,
}
