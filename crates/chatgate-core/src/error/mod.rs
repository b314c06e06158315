//! Error types for chatgate
//!
//! Every failure surfaced by the library is a [`ChatGateError`]. Upstream
//! failures are first normalized into an [`UpstreamFailure`] by the transport
//! and then classified exactly once (see `crate::recovery::classify`).

mod constructors;
mod types;
mod upstream;

pub use types::{ChatGateError, ChatGateResult};
pub use upstream::UpstreamFailure;
