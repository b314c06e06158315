//! Admission control and recovery from upstream rate limiting
//!
//! - `gate`: process-wide FIFO admission with minimum spacing
//! - `classify`: maps upstream failures onto the error taxonomy
//! - `backoff`: restarts rate-limited invocations with exponential waits

pub mod backoff;
pub mod classify;
pub mod gate;

pub use backoff::{BackoffConfig, BackoffController, RetryState};
pub use classify::{FailureClass, classify_failure, failure_to_error};
pub use gate::{DispatchPermit, GateConfig, RequestGate};
