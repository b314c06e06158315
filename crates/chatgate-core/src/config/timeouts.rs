//! HTTP timeouts for the upstream transport

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default connection timeout (30 seconds)
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default per-request timeout (120 seconds)
///
/// Search-augmented completions routinely take close to a minute upstream.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Connection and request timeouts of one HTTP call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to establish the connection
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Time allowed for the whole request, body included
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl TimeoutConfig {
    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validate timeout values
    pub fn validate(&self) -> Result<(), String> {
        if self.connect_timeout.is_zero() {
            return Err("Connection timeout must be greater than 0".to_string());
        }
        if self.request_timeout.is_zero() {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if self.connect_timeout > self.request_timeout {
            return Err("Connection timeout should not exceed request timeout".to_string());
        }
        Ok(())
    }
}
