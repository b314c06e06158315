//! Tool-call negotiation loop
//!
//! Drives one attempt of a logical invocation: call the model, and while it
//! answers `tool_calls`, append its turn plus one acknowledgement per
//! invocation and call it again. Search runs server-side, so the loop never
//! executes tools; it only closes each protocol turn.
//!
//! The loop holds no retry state. On a rate limit it fails, and the backoff
//! controller starts a fresh loop from the caller's original conversation.

use super::outcome::CompletionOutcome;
use crate::error::{ChatGateError, ChatGateResult};
use crate::llm::messages::{LlmMessage, LlmResponse, TokenUsage};
use crate::llm::providers::ChatTransport;
use crate::llm::request::{ChatRequest, ModelParameters};
use crate::llm::tools::{ToolAcknowledgement, ToolCall, ToolDeclaration};
use crate::recovery::{RequestGate, failure_to_error};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default maximum model calls in one attempt
pub const DEFAULT_MAX_TURNS: u32 = 10;

/// Settings of the tool-call negotiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolLoopConfig {
    /// Model calls allowed before the exchange counts as runaway
    pub max_turns: u32,
    /// Content of the tool-result message sent for each invocation
    pub acknowledgement: ToolAcknowledgement,
}

impl Default for ToolLoopConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            acknowledgement: ToolAcknowledgement::default(),
        }
    }
}

impl ToolLoopConfig {
    /// Set the turn ceiling
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set the acknowledgement mode
    pub fn with_acknowledgement(mut self, acknowledgement: ToolAcknowledgement) -> Self {
        self.acknowledgement = acknowledgement;
        self
    }
}

enum LoopState {
    AwaitingModel,
    ProcessingToolCalls(LlmResponse),
    Done(LlmResponse),
}

/// One attempt of a (possibly multi-turn) exchange
pub struct ToolCallLoop<'a> {
    transport: &'a dyn ChatTransport,
    gate: &'a RequestGate,
    params: &'a ModelParameters,
    config: &'a ToolLoopConfig,
    provider: &'a str,
}

impl<'a> ToolCallLoop<'a> {
    pub fn new(
        transport: &'a dyn ChatTransport,
        gate: &'a RequestGate,
        params: &'a ModelParameters,
        config: &'a ToolLoopConfig,
        provider: &'a str,
    ) -> Self {
        Self {
            transport,
            gate,
            params,
            config,
            provider,
        }
    }

    /// One model call without tool declarations
    ///
    /// Whatever the model answers is terminal, so the outcome never reports
    /// search.
    pub async fn run_single(&self, messages: &[LlmMessage]) -> ChatGateResult<CompletionOutcome> {
        let response = self.call_model(messages, &[]).await?;
        Ok(CompletionOutcome::plain(response.content, 1).with_usage(response.usage))
    }

    /// Exchange turns until the model gives a terminal answer
    pub async fn run(
        &self,
        messages: &[LlmMessage],
        tools: &[ToolDeclaration],
    ) -> ChatGateResult<CompletionOutcome> {
        let mut conversation = messages.to_vec();
        let mut state = LoopState::AwaitingModel;
        let mut used_search = false;
        let mut turns = 0u32;
        let mut usage: Option<TokenUsage> = None;

        let response = loop {
            state = match state {
                LoopState::AwaitingModel => {
                    if turns >= self.config.max_turns {
                        return Err(ChatGateError::protocol_with_context(
                            format!(
                                "model kept requesting tools after {} turns",
                                self.config.max_turns
                            ),
                            format!("{} messages in conversation", conversation.len()),
                        ));
                    }
                    turns += 1;

                    let response = self.call_model(&conversation, tools).await?;
                    if let Some(turn_usage) = &response.usage {
                        usage.get_or_insert_with(TokenUsage::default).add(turn_usage);
                    }
                    debug!(
                        turn = turns,
                        finish_reason = response
                            .finish_reason
                            .as_ref()
                            .map(|r| r.as_str())
                            .unwrap_or("none"),
                        tool_calls = response.tool_calls.len(),
                        "model turn completed"
                    );

                    if response.requests_tools() {
                        LoopState::ProcessingToolCalls(response)
                    } else {
                        LoopState::Done(response)
                    }
                }
                LoopState::ProcessingToolCalls(response) => {
                    if response.tool_calls.is_empty() {
                        return Err(ChatGateError::protocol_with_context(
                            "model finished with tool_calls but sent no invocations",
                            format!("turn {}", turns),
                        ));
                    }

                    conversation.push(response.to_assistant_message());
                    for call in &response.tool_calls {
                        self.check_declared(call, tools, turns)?;
                        used_search |= call.is_web_search();
                        conversation.push(self.acknowledge(call));
                    }
                    LoopState::AwaitingModel
                }
                LoopState::Done(response) => break response,
            };
        };

        let outcome = if used_search {
            CompletionOutcome::searched(response.content, turns)
        } else {
            CompletionOutcome::plain(response.content, turns)
        };
        Ok(outcome.with_usage(usage))
    }

    async fn call_model(
        &self,
        conversation: &[LlmMessage],
        tools: &[ToolDeclaration],
    ) -> ChatGateResult<LlmResponse> {
        let permit = self.gate.admit().await?;
        debug!(
            ticket = permit.ticket,
            waited_ms = permit.waited.as_millis() as u64,
            "dispatch admitted"
        );

        let request =
            ChatRequest::new(self.params.clone(), conversation.to_vec()).with_tools(tools.to_vec());
        self.transport
            .complete(&request)
            .await
            .map_err(|failure| failure_to_error(failure, self.provider))
    }

    fn check_declared(
        &self,
        call: &ToolCall,
        tools: &[ToolDeclaration],
        turn: u32,
    ) -> ChatGateResult<()> {
        if tools.iter().any(|tool| tool.name() == call.name) {
            Ok(())
        } else {
            Err(ChatGateError::protocol_with_context(
                format!("model invoked undeclared tool '{}'", call.name),
                format!("turn {}", turn),
            ))
        }
    }

    fn acknowledge(&self, call: &ToolCall) -> LlmMessage {
        debug!(tool = %call.name, call_id = %call.id, "acknowledging tool call");
        LlmMessage::tool(
            self.config.acknowledgement.content_for(call),
            call.id.clone(),
            Some(call.name.clone()),
        )
    }
}
