//! Query history models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of history entries kept per session.
pub const HISTORY_LIMIT: usize = 10;

/// A previously submitted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The question text
    pub query: String,
    /// Submission time
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create a history entry stamped with the current time.
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), timestamp: Utc::now() }
    }

    /// Get a truncated version of the question for display.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.query.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.query[..idx],
            None => &self.query,
        }
    }
}
