//! Normalized description of a failed upstream call

use std::fmt;
use std::time::Duration;

/// What the transport knows about a failed wire call.
///
/// Transports fill in whatever the upstream reported; classification into
/// the error taxonomy happens in one place, `recovery::classify_failure`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamFailure {
    /// HTTP status, absent for network-level failures
    pub status_code: Option<u16>,
    /// `error.type` from the response body
    pub error_type: Option<String>,
    /// `error.code` from the response body
    pub error_code: Option<String>,
    /// `retry-after` / `x-retry-after` hint
    pub retry_after: Option<Duration>,
    /// Sanitized, human-readable description
    pub message: String,
}

impl UpstreamFailure {
    /// Failure carrying an HTTP status
    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            message: message.into(),
            ..Default::default()
        }
    }

    /// Failure before any HTTP status was received
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set the upstream error type
    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Set the upstream error code
    pub fn with_error_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    /// Set the retry-after hint
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(status) => write!(f, "status {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
