//! The seam between orchestration and the wire

use crate::error::UpstreamFailure;
use crate::llm::messages::LlmResponse;
use crate::llm::request::ChatRequest;
use async_trait::async_trait;

/// One chat-completion call against an upstream endpoint
///
/// Implementations issue exactly one wire call per `complete` and never
/// retry or wait on their own; admission and backoff belong to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `request` and return the first choice of the response
    async fn complete(&self, request: &ChatRequest) -> Result<LlmResponse, UpstreamFailure>;
}
