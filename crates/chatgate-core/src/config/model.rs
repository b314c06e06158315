//! Top-level client configuration

use super::provider::ProviderConfig;
use crate::error::{ChatGateError, ChatGateResult};
use crate::orchestration::ToolLoopConfig;
use crate::recovery::{BackoffConfig, GateConfig};
use serde::{Deserialize, Serialize};

/// Everything a `CompletionClient` needs
///
/// ```toml
/// [provider]
/// base_url = "https://api.moonshot.cn/v1"
/// model = "kimi-k2-turbo-preview"
///
/// [gate]
/// min_interval = "25s"
/// pacing_delay = "1s"
///
/// [retry]
/// max_attempts = 5
/// base_delay = "30s"
///
/// [tool_loop]
/// max_turns = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Upstream endpoint
    pub provider: ProviderConfig,
    /// Admission spacing
    pub gate: GateConfig,
    /// Rate-limit retries
    pub retry: BackoffConfig,
    /// Tool-call negotiation
    pub tool_loop: ToolLoopConfig,
}

impl ClientConfig {
    /// Set the provider section
    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }

    /// Set the gate section
    pub fn with_gate(mut self, gate: GateConfig) -> Self {
        self.gate = gate;
        self
    }

    /// Set the retry section
    pub fn with_retry(mut self, retry: BackoffConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the tool loop section
    pub fn with_tool_loop(mut self, tool_loop: ToolLoopConfig) -> Self {
        self.tool_loop = tool_loop;
        self
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> ChatGateResult<()> {
        self.provider
            .validate()
            .map_err(|e| ChatGateError::config_with_context(e, "Validating [provider]"))?;
        self.validate_policies()
    }

    /// Validate gate, retry and tool loop sections only
    ///
    /// Used when the transport is supplied by the caller and the provider
    /// section is not consulted.
    pub fn validate_policies(&self) -> ChatGateResult<()> {
        if self.retry.min_delay > self.retry.max_delay {
            return Err(ChatGateError::config_with_context(
                "min_delay must not exceed max_delay",
                "Validating [retry]",
            ));
        }
        if self.retry.max_attempts > 10 {
            return Err(ChatGateError::config_with_context(
                "max_attempts should not exceed 10",
                "Validating [retry]",
            ));
        }
        if self.tool_loop.max_turns == 0 {
            return Err(ChatGateError::config_with_context(
                "max_turns must be at least 1",
                "Validating [tool_loop]",
            ));
        }
        Ok(())
    }
}
