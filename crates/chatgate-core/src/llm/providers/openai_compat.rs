//! OpenAI-compatible chat-completions transport

use super::error_utils::{failure_from_response, sanitize_provider_error_text};
use super::transport::ChatTransport;
use crate::config::ProviderConfig;
use crate::error::{ChatGateError, ChatGateResult, UpstreamFailure};
use crate::llm::converters::request_body;
use crate::llm::messages::LlmResponse;
use crate::llm::parsers::ResponseParser;
use crate::llm::request::ChatRequest;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, instrument};

/// Transport for endpoints speaking the OpenAI chat-completions protocol
/// (Moonshot/Kimi, OpenAI, most self-hosted gateways)
#[derive(Debug, Clone)]
pub struct OpenAiCompatTransport {
    config: ProviderConfig,
    http_client: Client,
}

impl OpenAiCompatTransport {
    /// Validate `config` and build an HTTP client with its timeouts
    pub fn new(config: ProviderConfig) -> ChatGateResult<Self> {
        config.validate().map_err(|e| {
            ChatGateError::config_with_context(e, format!("Configuring provider '{}'", config.name))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("chatgate/", env!("CARGO_PKG_VERSION"))),
        );

        let http_client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.timeouts.connect_timeout)
            .timeout(config.timeouts.request_timeout)
            .build()
            .map_err(|e| {
                ChatGateError::config_with_context(
                    format!("Failed to create HTTP client: {}", e),
                    format!("Configuring provider '{}'", config.name),
                )
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(config: ProviderConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[async_trait]
impl ChatTransport for OpenAiCompatTransport {
    #[instrument(
        skip(self, request),
        fields(
            provider = %self.config.name,
            model = %request.params.model,
            messages = request.messages.len(),
            tools = request.tools.len()
        ),
        level = "debug"
    )]
    async fn complete(&self, request: &ChatRequest) -> Result<LlmResponse, UpstreamFailure> {
        let body = request_body(request);
        let mut builder = self.http_client.post(self.config.completions_url()).json(&body);
        if let Some(api_key) = self.config.api_key() {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| {
            UpstreamFailure::network(format!(
                "{} request failed: {}",
                self.config.name,
                sanitize_provider_error_text(&e.to_string())
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            let failure = failure_from_response(response).await;
            debug!(status = status.as_u16(), "upstream call failed: {}", failure);
            return Err(failure);
        }

        let json: Value = response.json().await.map_err(|e| {
            UpstreamFailure::network(format!(
                "Failed to parse {} response: {}",
                self.config.name, e
            ))
        })?;

        let parsed = ResponseParser::parse_openai(&json)?;
        debug!(
            finish_reason = parsed.finish_reason.as_ref().map(|r| r.as_str()).unwrap_or("none"),
            tool_calls = parsed.tool_calls.len(),
            "upstream call completed"
        );
        Ok(parsed)
    }
}
