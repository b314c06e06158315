//! Rate-limit backoff for logical invocations
//!
//! The controller wraps a whole invocation, not a single wire call. When the
//! invocation fails with `RateLimited` it waits and runs the invocation again
//! from the beginning, so a multi-turn exchange never resumes with stale
//! tool-call ids after a long pause.

use crate::error::{ChatGateError, ChatGateResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Timing and budget of rate-limit retries
///
/// # Example
/// ```
/// use chatgate_core::recovery::BackoffConfig;
/// use std::time::Duration;
///
/// let config = BackoffConfig::default();
/// assert_eq!(config.delay_for_attempt(0, None), Duration::from_secs(30));
/// assert_eq!(config.delay_for_attempt(2, None), Duration::from_secs(120));
/// assert_eq!(config.delay_for_attempt(9, None), Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Number of retries after the first call
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base of the exponential series when the upstream gives no hint
    #[serde(default = "default_base_delay", with = "humantime_serde")]
    pub base_delay: Duration,
    /// Floor applied to every wait
    #[serde(default = "default_min_delay", with = "humantime_serde")]
    pub min_delay: Duration,
    /// Ceiling applied to every wait
    #[serde(default = "default_max_delay", with = "humantime_serde")]
    pub max_delay: Duration,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_min_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(300)
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay: default_base_delay(),
            min_delay: default_min_delay(),
            max_delay: default_max_delay(),
        }
    }
}

impl BackoffConfig {
    /// A config that surfaces the first rate limit as `MaxRetriesExceeded`
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }

    /// Set the retry budget
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the default base delay
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set floor and ceiling of the wait
    pub fn with_bounds(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    /// Wait before retry number `attempt` (0-indexed).
    ///
    /// `base × 2^attempt`, where `base` is the upstream hint if present,
    /// clamped into `[min_delay, max_delay]`. The ceiling wins if the bounds
    /// are inverted.
    pub fn delay_for_attempt(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let base = retry_after.unwrap_or(self.base_delay);
        let raw = 2u32
            .checked_pow(attempt)
            .and_then(|factor| base.checked_mul(factor))
            .unwrap_or(Duration::MAX);
        raw.max(self.min_delay).min(self.max_delay)
    }
}

/// Retry bookkeeping for one logical invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// Retries performed so far
    pub attempt: u32,
    /// Retry budget
    pub max_attempts: u32,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
        }
    }

    /// Whether another retry fits the budget
    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }

    fn advance(&mut self) {
        self.attempt = (self.attempt + 1).min(self.max_attempts);
    }
}

/// Retries rate-limited invocations with exponential backoff
#[derive(Debug, Clone, Default)]
pub struct BackoffController {
    config: BackoffConfig,
}

impl BackoffController {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// Run `invocation` until it succeeds, fails fatally, or the budget runs out.
    ///
    /// The closure receives the number of retries already performed and must
    /// rebuild its state from scratch on every call. Only `RateLimited` is
    /// retried; every other error is returned as is. Cancelling `cancel`
    /// during a wait abandons the pending retry.
    pub async fn run<T, F, Fut>(
        &self,
        mut invocation: F,
        cancel: Option<&CancellationToken>,
    ) -> ChatGateResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ChatGateResult<T>>,
    {
        let mut state = RetryState::new(self.config.max_attempts);

        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(ChatGateError::Cancelled);
            }

            let (message, retry_after) = match invocation(state.attempt).await {
                Ok(value) => {
                    if state.attempt > 0 {
                        debug!(retries = state.attempt, "invocation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(ChatGateError::RateLimited {
                    message,
                    retry_after,
                }) => (message, retry_after),
                Err(error) => return Err(error),
            };

            if !state.can_retry() {
                warn!(retries = state.attempt, "retry budget exhausted: {}", message);
                return Err(ChatGateError::max_retries(state.attempt, message));
            }

            let delay = self.config.delay_for_attempt(state.attempt, retry_after);
            warn!(
                retry = state.attempt + 1,
                max_attempts = state.max_attempts,
                delay_secs = delay.as_secs(),
                "rate limited, backing off: {}",
                message
            );

            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => return Err(ChatGateError::Cancelled),
                        _ = sleep(delay) => {}
                    }
                }
                None => sleep(delay).await,
            }
            state.advance();
        }
    }
}
