//! Configuration for chatgate
//!
//! A `ClientConfig` is read from a TOML or JSON file, overlaid with
//! `CHATGATE_*` environment variables and validated before a client is built.

mod loader;
pub mod model;
pub mod provider;
pub mod timeouts;

pub use model::ClientConfig;
pub use provider::{API_KEY_ENV_VARS, DEFAULT_BASE_URL, ProviderConfig};
pub use timeouts::TimeoutConfig;
