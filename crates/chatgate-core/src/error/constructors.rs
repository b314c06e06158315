//! Constructor methods for ChatGateError

use super::types::ChatGateError;
use std::time::Duration;

impl ChatGateError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a rate-limit error
    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after,
        }
    }

    /// Create an exhausted-retries error
    pub fn max_retries(attempts: u32, last_error: impl Into<String>) -> Self {
        Self::MaxRetriesExceeded {
            attempts,
            last_error: last_error.into(),
        }
    }

    /// Create a fatal upstream error
    pub fn upstream(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::UpstreamFatal {
            message: message.into(),
            status_code,
            provider: None,
        }
    }

    /// Create a fatal upstream error with provider
    pub fn upstream_with_provider(
        message: impl Into<String>,
        status_code: Option<u16>,
        provider: impl Into<String>,
    ) -> Self {
        Self::UpstreamFatal {
            message: message.into(),
            status_code,
            provider: Some(provider.into()),
        }
    }

    /// Create a protocol violation
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
            context: None,
        }
    }

    /// Create a protocol violation with context
    pub fn protocol_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new timeout error
    pub fn timeout(deadline: Duration) -> Self {
        Self::Timeout { deadline }
    }
}
