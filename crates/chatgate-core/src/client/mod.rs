//! Public facade over gate, backoff and tool-call loop
//!
//! Every wire call made by a `CompletionClient` waits at the shared
//! `RequestGate`, and every invocation runs under the `BackoffController`,
//! which restarts it from the caller's conversation after a rate limit.

mod chat;
mod constructor;
#[cfg(test)]
mod tests;
mod types;

pub use types::CompletionClient;
