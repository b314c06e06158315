//! Core error type for chatgate

use std::time::Duration;
use thiserror::Error;

/// Result type alias for chatgate operations
pub type ChatGateResult<T> = Result<T, ChatGateError>;

/// Main error type for chatgate
///
/// `RateLimited` is the only retryable kind. The backoff controller recovers
/// it locally and converts an exhausted budget into `MaxRetriesExceeded`, so
/// callers of the public client never observe it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatGateError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Upstream signalled quota exhaustion
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Retry budget exhausted while still being rate limited
    #[error("Max retries exceeded after {attempts} retries: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },

    /// Any other upstream failure (auth, malformed request, 5xx, network)
    #[error("Upstream error: {message}")]
    UpstreamFatal {
        message: String,
        status_code: Option<u16>,
        provider: Option<String>,
    },

    /// The tool-call negotiation went off protocol
    #[error("Protocol violation: {message}")]
    ProtocolViolation {
        message: String,
        context: Option<String>,
    },

    /// Invalid input errors
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// Invocation deadline expired
    #[error("Invocation timeout after {deadline:?}")]
    Timeout { deadline: Duration },

    /// Invocation was cancelled
    #[error("Invocation was cancelled")]
    Cancelled,
}

impl ChatGateError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "CHATGATE_CONFIG",
            Self::RateLimited { .. } => "CHATGATE_RATE_LIMITED",
            Self::MaxRetriesExceeded { .. } => "CHATGATE_MAX_RETRIES",
            Self::UpstreamFatal { .. } => "CHATGATE_UPSTREAM",
            Self::ProtocolViolation { .. } => "CHATGATE_PROTOCOL",
            Self::InvalidInput { .. } => "CHATGATE_INVALID_INPUT",
            Self::Timeout { .. } => "CHATGATE_TIMEOUT",
            Self::Cancelled => "CHATGATE_CANCELLED",
        }
    }

    /// Check if this error may succeed on retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Upstream-provided retry hint, if this is a rate-limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Optional context attached to the error
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } | Self::ProtocolViolation { context, .. } => {
                context.as_deref()
            }
            Self::UpstreamFatal { provider, .. } => provider.as_deref(),
            Self::InvalidInput { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}
