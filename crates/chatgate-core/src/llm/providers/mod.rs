//! Upstream transports

pub mod error_utils;
mod openai_compat;
mod transport;

pub use error_utils::{parse_retry_after, sanitize_provider_error_text};
pub use openai_compat::OpenAiCompatTransport;
pub use transport::ChatTransport;

#[cfg(test)]
pub use transport::MockChatTransport;
