//! CLI argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

/// Default system prompt when `--system` is not given
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Placeholder replaced by the message in `--user-template`
pub const MESSAGE_PLACEHOLDER: &str = "{name}";

#[derive(Debug, Parser)]
#[command(name = "chatgate")]
#[command(about = "Rate-limited chat completion with optional web search")]
#[command(version)]
pub struct Cli {
    /// Message to send
    pub message: String,

    /// Path to a TOML or JSON configuration file
    #[arg(long, env = "CHATGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// System prompt
    #[arg(long, default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system: String,

    /// User message template; `{name}` is replaced by the message
    #[arg(long, default_value = MESSAGE_PLACEHOLDER)]
    pub user_template: String,

    /// Plain completion without the web search tool
    #[arg(long)]
    pub no_search: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Abandon the request after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Cli {
    /// User message with the template applied
    pub fn user_message(&self) -> String {
        if self.user_template.contains(MESSAGE_PLACEHOLDER) {
            self.user_template.replace(MESSAGE_PLACEHOLDER, self.message.trim())
        } else {
            format!("{}\n\n{}", self.user_template, self.message.trim())
        }
    }
}
