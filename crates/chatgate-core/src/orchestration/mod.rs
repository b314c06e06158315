//! Multi-turn negotiation with the remote model

pub mod outcome;
pub mod tool_loop;

pub use outcome::{CompletionOutcome, SEARCH_NOTE, SearchInfo};
pub use tool_loop::{DEFAULT_MAX_TURNS, ToolCallLoop, ToolLoopConfig};
