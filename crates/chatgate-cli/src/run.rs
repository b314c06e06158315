//! Executes one chat request and prints the outcome

use crate::args::Cli;
use anyhow::{Context, Result, bail};
use chatgate_core::{ChatGateError, ClientConfig, CompletionClient, CompletionOutcome, LlmMessage};
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

/// Build the conversation for the request
pub fn build_conversation(cli: &Cli) -> Result<Vec<LlmMessage>> {
    if cli.message.trim().is_empty() {
        bail!("message must not be empty");
    }
    Ok(vec![
        LlmMessage::system(cli.system.clone()),
        LlmMessage::user(cli.user_message()),
    ])
}

/// Run the request; `Ok(false)` means the upstream call failed
pub async fn run(cli: Cli) -> Result<bool> {
    let messages = build_conversation(&cli)?;
    let config = ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let mut client = CompletionClient::new(config).context("Failed to create client")?;
    if let Some(secs) = cli.timeout_secs {
        client = client.with_deadline(Duration::from_secs(secs));
    }

    info!(search = !cli.no_search, "sending request");
    let result = if cli.no_search {
        client.simple_chat(&messages).await
    } else {
        client.chat_with_web_search(&messages).await
    };

    match result {
        Ok(outcome) => {
            print_outcome(&outcome)?;
            Ok(true)
        }
        Err(err) => {
            error!(code = err.error_code(), "request failed: {}", err);
            print_error(&err)?;
            Ok(false)
        }
    }
}

fn print_outcome(outcome: &CompletionOutcome) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}

fn print_error(err: &ChatGateError) -> Result<()> {
    let body = json!({
        "error": {
            "code": err.error_code(),
            "message": err.to_string(),
        }
    });
    eprintln!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
