//! Chat operations

use super::types::CompletionClient;
use crate::error::{ChatGateError, ChatGateResult};
use crate::llm::messages::LlmMessage;
use crate::llm::tools::ToolDeclaration;
use crate::orchestration::{CompletionOutcome, ToolCallLoop};
use std::future::Future;
use tokio::time::timeout;
use tracing::{info, instrument};

impl CompletionClient {
    /// Single model call without tools.
    ///
    /// The outcome never reports search. Rate limits are retried with
    /// backoff; any other failure is returned as is.
    #[instrument(
        skip(self, messages),
        fields(provider = %self.config.provider.name, messages = messages.len())
    )]
    pub async fn simple_chat(&self, messages: &[LlmMessage]) -> ChatGateResult<CompletionOutcome> {
        validate_conversation(messages)?;
        let tool_loop = self.tool_loop();

        let outcome = self
            .guarded(self.backoff.run(
                |attempt| {
                    let tool_loop = &tool_loop;
                    async move {
                        tool_loop
                            .run_single(messages)
                            .await
                            .map(|outcome| outcome.with_retries(attempt))
                    }
                },
                self.cancel.as_ref(),
            ))
            .await?;

        info!(retries = outcome.retries, "simple chat completed");
        Ok(outcome)
    }

    /// Run the tool-call loop with the declared tools until a terminal answer.
    ///
    /// After a rate limit the whole exchange restarts from `messages`;
    /// partial tool-call progress of the failed attempt is discarded.
    #[instrument(
        skip(self, messages, tools),
        fields(
            provider = %self.config.provider.name,
            messages = messages.len(),
            tools = tools.len()
        )
    )]
    pub async fn chat_with_tools(
        &self,
        messages: &[LlmMessage],
        tools: &[ToolDeclaration],
    ) -> ChatGateResult<CompletionOutcome> {
        validate_conversation(messages)?;
        let tool_loop = self.tool_loop();

        let outcome = self
            .guarded(self.backoff.run(
                |attempt| {
                    let tool_loop = &tool_loop;
                    async move {
                        tool_loop
                            .run(messages, tools)
                            .await
                            .map(|outcome| outcome.with_retries(attempt))
                    }
                },
                self.cancel.as_ref(),
            ))
            .await?;

        info!(
            turns = outcome.turns,
            retries = outcome.retries,
            used_web_search = outcome.used_web_search,
            "chat completed"
        );
        Ok(outcome)
    }

    /// `chat_with_tools` with the built-in web search tool
    pub async fn chat_with_web_search(
        &self,
        messages: &[LlmMessage],
    ) -> ChatGateResult<CompletionOutcome> {
        self.chat_with_tools(messages, &[ToolDeclaration::web_search()])
            .await
    }

    fn tool_loop(&self) -> ToolCallLoop<'_> {
        ToolCallLoop::new(
            self.transport.as_ref(),
            &self.gate,
            &self.config.provider.model,
            &self.config.tool_loop,
            &self.config.provider.name,
        )
    }

    /// Apply the cancellation token and deadline to a whole invocation.
    ///
    /// Dropping the invocation future removes it from the gate queue and
    /// abandons any pending backoff wait.
    async fn guarded<T, F>(&self, invocation: F) -> ChatGateResult<T>
    where
        F: Future<Output = ChatGateResult<T>>,
    {
        let cancellable = async {
            match &self.cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => Err(ChatGateError::Cancelled),
                        result = invocation => result,
                    }
                }
                None => invocation.await,
            }
        };

        match self.deadline {
            Some(deadline) => timeout(deadline, cancellable)
                .await
                .map_err(|_| ChatGateError::timeout(deadline))?,
            None => cancellable.await,
        }
    }
}

fn validate_conversation(messages: &[LlmMessage]) -> ChatGateResult<()> {
    if messages.is_empty() {
        return Err(ChatGateError::invalid_input_field(
            "conversation must contain at least one message",
            "messages",
        ));
    }
    Ok(())
}
