//! Conversion of requests into the OpenAI-compatible wire format

use crate::llm::messages::LlmMessage;
use crate::llm::request::ChatRequest;
use crate::llm::tools::ToolDeclaration;
use serde_json::{Value, json};

/// Message format converter
pub struct MessageConverter;

impl MessageConverter {
    /// Convert messages for the OpenAI chat-completions format
    pub fn to_openai(messages: &[LlmMessage]) -> Vec<Value> {
        messages.iter().map(Self::message_to_openai).collect()
    }

    fn message_to_openai(message: &LlmMessage) -> Value {
        let mut value = json!({
            "role": message.role.to_string(),
            "content": message.content,
        });

        if message.has_tool_calls() {
            let calls: Vec<Value> = message
                .tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": call.kind,
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments,
                        }
                    })
                })
                .collect();
            value["tool_calls"] = Value::Array(calls);
        }
        if let Some(tool_call_id) = &message.tool_call_id {
            value["tool_call_id"] = json!(tool_call_id);
        }
        if let Some(name) = &message.name {
            value["name"] = json!(name);
        }

        value
    }
}

/// Tool format converter
pub struct ToolConverter;

impl ToolConverter {
    /// Convert tools for the OpenAI format
    ///
    /// Built-in tools use the `builtin_function` type and carry only a name.
    pub fn to_openai(tools: &[ToolDeclaration]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| match tool {
                ToolDeclaration::Builtin { name } => json!({
                    "type": "builtin_function",
                    "function": { "name": name }
                }),
                ToolDeclaration::Function {
                    name,
                    description,
                    parameters,
                } => json!({
                    "type": "function",
                    "function": {
                        "name": name,
                        "description": description,
                        "parameters": parameters
                    }
                }),
            })
            .collect()
    }
}

/// Build the full chat-completions request body
pub fn request_body(request: &ChatRequest) -> Value {
    let mut body = json!({
        "model": request.params.model,
        "messages": MessageConverter::to_openai(&request.messages),
        "temperature": request.params.temperature,
        "max_tokens": request.params.max_tokens,
    });

    if !request.tools.is_empty() {
        body["tools"] = Value::Array(ToolConverter::to_openai(&request.tools));
    }

    body
}
