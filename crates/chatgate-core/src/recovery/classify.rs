//! Mapping of upstream failures onto the error taxonomy

use crate::error::{ChatGateError, UpstreamFailure};
use std::time::Duration;

/// Error types and codes that upstreams use to signal quota exhaustion
const RATE_LIMIT_MARKERS: &[&str] = &[
    "rate_limit_reached_error",
    "rate_limit_exceeded",
    "rate_limit_error",
    "too_many_requests",
    "insufficient_quota",
    "quota_exceeded",
    "exceeded_current_quota_error",
    "engine_overloaded_error",
];

/// Recovery class of a failed upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Quota exhaustion, recoverable by waiting
    RateLimited { retry_after: Option<Duration> },
    /// Anything else
    Fatal,
}

impl FailureClass {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

fn is_rate_limit_marker(value: Option<&str>) -> bool {
    value.is_some_and(|value| {
        let value = value.trim().to_ascii_lowercase();
        RATE_LIMIT_MARKERS.contains(&value.as_str())
    })
}

/// Classify a failed upstream call.
///
/// A call is rate limited when the upstream answered 429, named a quota
/// error in its body, or sent a retry-after hint. Everything else (auth,
/// malformed request, 5xx, network) is fatal.
pub fn classify_failure(failure: &UpstreamFailure) -> FailureClass {
    let rate_limited = failure.status_code == Some(429)
        || is_rate_limit_marker(failure.error_type.as_deref())
        || is_rate_limit_marker(failure.error_code.as_deref())
        || failure.retry_after.is_some();

    if rate_limited {
        FailureClass::RateLimited {
            retry_after: failure.retry_after,
        }
    } else {
        FailureClass::Fatal
    }
}

/// Turn a failed upstream call into the error surfaced to callers
pub fn failure_to_error(failure: UpstreamFailure, provider: &str) -> ChatGateError {
    match classify_failure(&failure) {
        FailureClass::RateLimited { retry_after } => {
            ChatGateError::rate_limited(failure.to_string(), retry_after)
        }
        FailureClass::Fatal => ChatGateError::upstream_with_provider(
            failure.to_string(),
            failure.status_code,
            provider,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_429_is_rate_limited() {
        let failure = UpstreamFailure::http(429, "Too Many Requests");
        assert_eq!(
            classify_failure(&failure),
            FailureClass::RateLimited { retry_after: None }
        );
    }

    #[test]
    fn test_quota_error_type_is_rate_limited() {
        // some gateways wrap quota errors in a 400 or 403
        let failure = UpstreamFailure::http(403, "quota").with_error_type("rate_limit_reached_error");
        assert!(classify_failure(&failure).is_rate_limited());

        let failure = UpstreamFailure::http(400, "quota").with_error_code("Insufficient_Quota");
        assert!(classify_failure(&failure).is_rate_limited());
    }

    #[test]
    fn test_retry_after_hint_is_rate_limited() {
        let failure =
            UpstreamFailure::http(503, "overloaded").with_retry_after(Duration::from_secs(12));
        assert_eq!(
            classify_failure(&failure),
            FailureClass::RateLimited {
                retry_after: Some(Duration::from_secs(12))
            }
        );
    }

    #[test]
    fn test_other_failures_are_fatal() {
        for failure in [
            UpstreamFailure::http(401, "invalid api key").with_error_type("invalid_authentication_error"),
            UpstreamFailure::http(400, "bad request").with_error_type("invalid_request_error"),
            UpstreamFailure::http(500, "internal error"),
            UpstreamFailure::network("connection refused"),
        ] {
            assert_eq!(classify_failure(&failure), FailureClass::Fatal, "{}", failure);
        }
    }

    #[test]
    fn test_failure_to_error() {
        let error = failure_to_error(UpstreamFailure::http(429, "slow down"), "moonshot");
        assert_eq!(error, ChatGateError::rate_limited("status 429: slow down", None));

        let error = failure_to_error(UpstreamFailure::http(401, "denied"), "moonshot");
        assert_eq!(
            error,
            ChatGateError::upstream_with_provider("status 401: denied", Some(401), "moonshot")
        );
        assert_eq!(error.context(), Some("moonshot"));
    }
}
