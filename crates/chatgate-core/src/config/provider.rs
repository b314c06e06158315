//! Upstream provider configuration

use super::timeouts::TimeoutConfig;
use crate::llm::request::ModelParameters;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default provider name
pub const DEFAULT_PROVIDER: &str = "moonshot";

/// Default OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.moonshot.cn/v1";

/// Environment variables checked for the API key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["CHATGATE_API_KEY", "KIMI_API_KEY", "MOONSHOT_API_KEY"];

/// Configuration of the chat-completion endpoint
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider name, used in logs and error context
    pub name: String,
    /// Endpoint base URL, without the `/chat/completions` suffix
    pub base_url: String,
    /// Bearer token
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model and sampling parameters
    #[serde(flatten)]
    pub model: ModelParameters,
    /// HTTP timeouts
    pub timeouts: TimeoutConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROVIDER.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: ModelParameters::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

// keep the key out of debug logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a provider config with defaults
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model.model = model.into();
        self
    }

    /// Set timeout configuration
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Configured API key, ignoring blank values
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Chat-completions URL
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Local endpoints (e.g. a self-hosted gateway) may run without a key
    pub fn requires_api_key(&self) -> bool {
        let host = self
            .base_url
            .split("://")
            .nth(1)
            .and_then(|rest| rest.split(['/', ':']).next())
            .unwrap_or_default();
        !matches!(host, "localhost" | "127.0.0.1" | "0.0.0.0")
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Provider name cannot be empty".to_string());
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "Base URL '{}' must start with http:// or https://",
                self.base_url
            ));
        }

        if self.requires_api_key() && self.api_key().is_none() {
            return Err(format!(
                "API key is required for provider '{}'. Set it in config or one of {}",
                self.name,
                API_KEY_ENV_VARS.join(", ")
            ));
        }

        if self.model.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err("Temperature must be between 0 and 2".to_string());
        }
        if self.model.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }

        self.timeouts.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_provider_needs_key() {
        let config = ProviderConfig::default();
        assert_eq!(config.completions_url(), "https://api.moonshot.cn/v1/chat/completions");
        assert!(config.requires_api_key());

        let err = config.validate().unwrap_err();
        assert!(err.contains("KIMI_API_KEY"), "{}", err);

        assert!(ProviderConfig::default().with_api_key("sk-test").validate().is_ok());
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = ProviderConfig::default().with_api_key("   ");
        assert_eq!(config.api_key(), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_endpoint_without_key() {
        let config = ProviderConfig::new("local").with_base_url("http://127.0.0.1:8080/v1/");
        assert!(!config.requires_api_key());
        assert!(config.validate().is_ok());
        assert_eq!(config.completions_url(), "http://127.0.0.1:8080/v1/chat/completions");
    }

    #[test]
    fn test_invalid_values() {
        let base = ProviderConfig::default().with_api_key("sk-test");

        assert!(base.clone().with_base_url("api.moonshot.cn").validate().is_err());
        assert!(base.clone().with_model("").validate().is_err());

        let mut config = base;
        config.model.temperature = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ProviderConfig::default().with_api_key("sk-very-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
