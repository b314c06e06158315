//! Response parsing for the OpenAI-compatible wire format

use crate::error::UpstreamFailure;
use crate::llm::messages::{FinishReason, LlmResponse, TokenUsage};
use crate::llm::tools::{FUNCTION_CALL_TYPE, ToolCall};
use serde_json::Value;

/// Response parser
pub struct ResponseParser;

impl ResponseParser {
    /// Parse a chat-completions response body, keeping the first choice.
    pub fn parse_openai(response: &Value) -> Result<LlmResponse, UpstreamFailure> {
        let choice = response["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .ok_or_else(|| UpstreamFailure::network("response contained no choices"))?;
        let message = &choice["message"];

        let content = message["content"].as_str().unwrap_or("").to_string();

        let tool_calls = match message["tool_calls"].as_array() {
            Some(calls) => calls
                .iter()
                .enumerate()
                .map(|(index, call)| Self::parse_tool_call(index, call))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let usage = response["usage"].as_object().map(|usage| {
            let field = |name: &str| usage.get(name).and_then(Value::as_u64).unwrap_or(0) as u32;
            TokenUsage {
                prompt_tokens: field("prompt_tokens"),
                completion_tokens: field("completion_tokens"),
                total_tokens: field("total_tokens"),
            }
        });

        Ok(LlmResponse {
            content,
            tool_calls,
            finish_reason: choice["finish_reason"].as_str().map(FinishReason::parse),
            usage,
            model: response["model"].as_str().map(str::to_string),
            id: response["id"].as_str().map(str::to_string),
        })
    }

    /// Every call must carry an id and a function object; a call the loop
    /// cannot answer by id would break the conversation.
    fn parse_tool_call(index: usize, call: &Value) -> Result<ToolCall, UpstreamFailure> {
        let id = call["id"]
            .as_str()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                UpstreamFailure::network(format!("tool call {} has no id", index))
            })?;
        let function = call["function"].as_object().ok_or_else(|| {
            UpstreamFailure::network(format!("tool call '{}' has no function object", id))
        })?;
        let arguments = match function.get("arguments") {
            Some(Value::String(raw)) => raw.clone(),
            Some(Value::Null) | None => String::new(),
            // Some gateways send an object instead of a JSON string
            Some(other) => other.to_string(),
        };

        Ok(ToolCall {
            id: id.to_string(),
            name: function
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            arguments,
            kind: call["type"]
                .as_str()
                .unwrap_or(FUNCTION_CALL_TYPE)
                .to_string(),
        })
    }

    /// Extract `(error.type, error.code, error.message)` from an error body.
    pub fn parse_error_body(body: &str) -> (Option<String>, Option<String>, Option<String>) {
        let Ok(json) = serde_json::from_str::<Value>(body) else {
            return (None, None, None);
        };
        let error = &json["error"];
        let text = |key: &str| match &error[key] {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        (text("type"), text("code"), text("message"))
    }
}
