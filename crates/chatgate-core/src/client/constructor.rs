//! CompletionClient constructors and builders

use super::types::CompletionClient;
use crate::config::ClientConfig;
use crate::error::ChatGateResult;
use crate::llm::providers::{ChatTransport, OpenAiCompatTransport};
use crate::recovery::{BackoffController, RequestGate};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

impl CompletionClient {
    /// Create a client talking to the configured OpenAI-compatible endpoint
    ///
    /// Validates the whole configuration; a missing API key for a remote
    /// endpoint is a `Config` error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chatgate_core::config::{ClientConfig, ProviderConfig};
    /// use chatgate_core::client::CompletionClient;
    /// use chatgate_core::llm::LlmMessage;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ClientConfig::default()
    ///     .with_provider(ProviderConfig::default().with_api_key("sk-..."));
    /// let client = CompletionClient::new(config)?;
    ///
    /// let messages = vec![
    ///     LlmMessage::system("You are an analyst"),
    ///     LlmMessage::user("Company X"),
    /// ];
    /// let outcome = client.chat_with_web_search(&messages).await?;
    /// println!("{} (searched: {})", outcome.content, outcome.used_web_search);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: ClientConfig) -> ChatGateResult<Self> {
        config.validate()?;
        let transport = OpenAiCompatTransport::new(config.provider.clone())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client that dispatches through an existing gate
    ///
    /// This is the constructor to use when clients are built per request:
    /// every client created from clones of `gate` shares one queue and one
    /// dispatch clock.
    pub fn with_shared_gate(config: ClientConfig, gate: RequestGate) -> ChatGateResult<Self> {
        Ok(Self::new(config)?.with_gate(gate))
    }

    /// Create a client over a caller-supplied transport
    ///
    /// The provider section is only used for model parameters and error
    /// context, so it is not validated here.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn ChatTransport>,
    ) -> ChatGateResult<Self> {
        config.validate_policies()?;
        debug!(
            provider = %config.provider.name,
            model = %config.provider.model.model,
            min_interval_ms = config.gate.min_interval.as_millis() as u64,
            "creating completion client"
        );

        Ok(Self {
            transport,
            gate: RequestGate::new(config.gate.clone()),
            backoff: BackoffController::new(config.retry.clone()),
            config,
            deadline: None,
            cancel: None,
        })
    }

    /// Share an existing gate, so several clients respect one spacing
    pub fn with_gate(mut self, gate: RequestGate) -> Self {
        self.gate = gate;
        self
    }

    /// Bound every invocation by `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Abandon invocations when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The gate this client dispatches through
    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// Effective configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
