//! Chatgate CLI
//!
//! Sends one message to the configured chat-completion endpoint through the
//! admission gate and backoff controller and prints the outcome as JSON.
//!
//! ```bash
//! KIMI_API_KEY=sk-... chatgate "Company X"
//! chatgate --no-search --system "You are an analyst" "Company X"
//! ```
//!
//! Logging follows `RUST_LOG` (e.g. `RUST_LOG=chatgate_core=debug`).

mod args;
mod run;

use args::Cli;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // .env is optional
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    if run::run(cli).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
