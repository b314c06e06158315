//! Result of one logical invocation

use crate::llm::messages::TokenUsage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Note attached to answers that used web search
pub const SEARCH_NOTE: &str = "This answer is based on the latest web search results";

/// Metadata about server-side search performed during an invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    pub search_performed: bool,
    /// When the invocation completed
    pub timestamp: DateTime<Utc>,
    pub note: String,
}

impl SearchInfo {
    /// Search performed, completed now
    pub fn performed_now() -> Self {
        Self {
            search_performed: true,
            timestamp: Utc::now(),
            note: SEARCH_NOTE.to_string(),
        }
    }
}

/// Final answer plus search metadata
///
/// Serializes to `{content, usedWebSearch, searchInfo, turns, retries, usage}`
/// with `searchInfo` set to `null` when no search ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    /// Text of the terminal model turn, possibly empty
    pub content: String,
    /// Whether any turn invoked the search tool
    pub used_web_search: bool,
    /// Present iff `used_web_search`
    pub search_info: Option<SearchInfo>,
    /// Model calls made by the successful attempt
    pub turns: u32,
    /// Rate-limit restarts before the successful attempt
    pub retries: u32,
    /// Token usage summed over the successful attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl CompletionOutcome {
    /// Outcome of an exchange that never searched
    pub fn plain(content: impl Into<String>, turns: u32) -> Self {
        Self {
            content: content.into(),
            used_web_search: false,
            search_info: None,
            turns,
            retries: 0,
            usage: None,
        }
    }

    /// Outcome of an exchange that searched
    pub fn searched(content: impl Into<String>, turns: u32) -> Self {
        Self {
            used_web_search: true,
            search_info: Some(SearchInfo::performed_now()),
            ..Self::plain(content, turns)
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }
}
