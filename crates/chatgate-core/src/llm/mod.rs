//! Chat messages, tool declarations and the OpenAI-compatible wire codec

pub mod converters;
pub mod messages;
pub mod parsers;
pub mod providers;
pub mod request;
pub mod tools;

pub use messages::{FinishReason, LlmMessage, LlmResponse, MessageRole, TokenUsage};
pub use providers::{ChatTransport, OpenAiCompatTransport};
pub use request::{ChatRequest, ModelParameters};
pub use tools::{
    BUILTIN_CALL_TYPE, FUNCTION_CALL_TYPE, ToolAcknowledgement, ToolCall, ToolDeclaration,
    WEB_SEARCH_TOOL,
};
