//! Chatgate Core Library
//!
//! Client-side orchestration for rate-limited chat-completion services with
//! server-executed tool calls: a shared FIFO admission gate, backoff that
//! restarts rate-limited invocations, and a tool-call loop that resolves a
//! multi-turn exchange into one answer plus search metadata.

pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod orchestration;
pub mod recovery;

// Re-export commonly used types
pub use client::CompletionClient;
pub use config::{ClientConfig, ProviderConfig};
pub use error::{ChatGateError, ChatGateResult, UpstreamFailure};
pub use llm::{ChatTransport, LlmMessage, LlmResponse, ToolDeclaration};
pub use orchestration::{CompletionOutcome, SearchInfo, ToolLoopConfig};
pub use recovery::{BackoffConfig, GateConfig, RequestGate};
