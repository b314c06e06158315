//! CompletionClient type definition

use crate::config::ClientConfig;
use crate::llm::providers::ChatTransport;
use crate::recovery::{BackoffController, RequestGate};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Chat-completion client with admission control and rate-limit recovery
///
/// Cloning is cheap; clones share the transport and the gate.
///
/// Spacing is enforced per [`RequestGate`], and a client built with
/// [`CompletionClient::new`] owns a fresh one. When clients are created per
/// request, build one gate at startup and hand it to each of them with
/// [`CompletionClient::with_shared_gate`] (or [`CompletionClient::with_gate`]);
/// otherwise concurrent requests are not spaced against each other.
#[derive(Clone)]
pub struct CompletionClient {
    pub(super) transport: Arc<dyn ChatTransport>,
    pub(super) gate: RequestGate,
    pub(super) backoff: BackoffController,
    pub(super) config: ClientConfig,
    pub(super) deadline: Option<Duration>,
    pub(super) cancel: Option<CancellationToken>,
}

impl fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionClient")
            .field("provider", &self.config.provider.name)
            .field("model", &self.config.provider.model.model)
            .field("gate", &self.gate)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
