//! Loading configuration from files and the environment

use super::model::ClientConfig;
use super::provider::API_KEY_ENV_VARS;
use crate::error::{ChatGateError, ChatGateResult};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

impl ClientConfig {
    /// Load configuration from a TOML or JSON file, chosen by extension
    pub fn from_file(path: &Path) -> ChatGateResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ChatGateError::config_with_context(
                format!("Failed to read config file: {}", e),
                format!("Reading configuration from '{}'", path.display()),
            )
        })?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| {
                ChatGateError::config_with_context(
                    format!("Failed to parse TOML config: {}", e),
                    format!("Deserializing TOML configuration from '{}'", path.display()),
                )
            }),
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                ChatGateError::config_with_context(
                    format!("Failed to parse JSON config: {}", e),
                    format!("Deserializing JSON configuration from '{}'", path.display()),
                )
            }),
            other => Err(ChatGateError::config_with_context(
                format!(
                    "Unsupported config format '{}', expected .toml or .json",
                    other.unwrap_or("")
                ),
                format!("Loading configuration from '{}'", path.display()),
            )),
        }
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> ChatGateResult<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Optional file, then the process environment, then validation
    pub fn load(path: Option<&Path>) -> ChatGateResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay `CHATGATE_*` variables read through `lookup`.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `CHATGATE_API_KEY`, `KIMI_API_KEY`, `MOONSHOT_API_KEY` | `provider.api_key` (first set wins) |
    /// | `CHATGATE_BASE_URL` | `provider.base_url` |
    /// | `CHATGATE_MODEL` | `provider.model` |
    /// | `CHATGATE_MIN_INTERVAL_SECS` | `gate.min_interval` |
    /// | `CHATGATE_PACING_DELAY_SECS` | `gate.pacing_delay` |
    /// | `CHATGATE_MAX_RETRIES` | `retry.max_attempts` |
    /// | `CHATGATE_MAX_TURNS` | `tool_loop.max_turns` |
    pub fn apply_env<F>(&mut self, lookup: F) -> ChatGateResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = API_KEY_ENV_VARS.iter().find_map(|key| lookup(*key)) {
            self.provider.api_key = Some(api_key);
        }
        if let Some(base_url) = lookup("CHATGATE_BASE_URL") {
            self.provider.base_url = base_url;
        }
        if let Some(model) = lookup("CHATGATE_MODEL") {
            self.provider.model.model = model;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "CHATGATE_MIN_INTERVAL_SECS")? {
            self.gate.min_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "CHATGATE_PACING_DELAY_SECS")? {
            self.gate.pacing_delay = Duration::from_secs(secs);
        }
        if let Some(max_attempts) = parse_var(&lookup, "CHATGATE_MAX_RETRIES")? {
            self.retry.max_attempts = max_attempts;
        }
        if let Some(max_turns) = parse_var(&lookup, "CHATGATE_MAX_TURNS")? {
            self.tool_loop.max_turns = max_turns;
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> ChatGateResult<Option<T>> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ChatGateError::config(format!("Invalid {} value: '{}'", key, raw))),
        None => Ok(None),
    }
}
