//! Tool invocation and declaration types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the server-executed web search tool
pub const WEB_SEARCH_TOOL: &str = "$web_search";

/// Wire type of a plain function call
pub const FUNCTION_CALL_TYPE: &str = "function";

/// Wire type of a call to a server-executed tool
pub const BUILTIN_CALL_TYPE: &str = "builtin_function";

fn default_call_kind() -> String {
    FUNCTION_CALL_TYPE.to_string()
}

/// A tool invocation emitted by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier, echoed back by the matching tool result
    pub id: String,
    /// Name of the invoked tool
    pub name: String,
    /// Raw argument text, passed through untouched
    pub arguments: String,
    /// Wire `type` as received, sent back unchanged in the assistant turn
    #[serde(rename = "type", default = "default_call_kind")]
    pub kind: String,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
            kind: default_call_kind(),
        }
    }

    /// Set the wire type
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Whether this is the built-in web search
    pub fn is_web_search(&self) -> bool {
        self.name == WEB_SEARCH_TOOL
    }
}

/// A tool the model is allowed to invoke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolDeclaration {
    /// Executed by the upstream service itself
    Builtin { name: String },
    /// Plain function tool with a JSON schema
    Function {
        name: String,
        description: String,
        parameters: Value,
    },
}

impl ToolDeclaration {
    /// The built-in web search tool
    pub fn web_search() -> Self {
        Self::Builtin {
            name: WEB_SEARCH_TOOL.to_string(),
        }
    }

    /// Declared tool name
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin { name } | Self::Function { name, .. } => name,
        }
    }
}

/// What the orchestrator answers for an acknowledged invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "text", rename_all = "snake_case")]
pub enum ToolAcknowledgement {
    /// Return the invocation arguments verbatim
    EchoArguments,
    /// Return a constant note
    Fixed(String),
}

impl Default for ToolAcknowledgement {
    fn default() -> Self {
        Self::EchoArguments
    }
}

impl ToolAcknowledgement {
    /// Tool-result content for `call`
    pub fn content_for(&self, call: &ToolCall) -> String {
        match self {
            Self::EchoArguments => call.arguments.clone(),
            Self::Fixed(text) => text.clone(),
        }
    }
}
