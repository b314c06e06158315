//! Wire-independent chat request

use crate::llm::messages::LlmMessage;
use crate::llm::tools::ToolDeclaration;
use serde::{Deserialize, Serialize};

/// Model sampling parameters sent with every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum completion tokens
    pub max_tokens: u32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            model: "kimi-k2-turbo-preview".to_string(),
            temperature: 0.0,
            max_tokens: 4000,
        }
    }
}

/// One upstream call: parameters, the ordered conversation and tool declarations
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub params: ModelParameters,
    pub messages: Vec<LlmMessage>,
    pub tools: Vec<ToolDeclaration>,
}

impl ChatRequest {
    /// Create a request without tools
    pub fn new(params: ModelParameters, messages: Vec<LlmMessage>) -> Self {
        Self {
            params,
            messages,
            tools: Vec::new(),
        }
    }

    /// Attach tool declarations
    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }
}
