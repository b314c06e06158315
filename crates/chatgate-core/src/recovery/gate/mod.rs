//! Process-wide admission gate for outbound calls
//!
//! Serializes dispatches to the completion endpoint in arrival order and
//! keeps a minimum spacing between them, whatever the number of concurrent
//! invocations.

mod admission;
mod types;


pub use admission::RequestGate;
pub use types::{DispatchPermit, GateConfig};
