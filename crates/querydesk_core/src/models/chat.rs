//! Chat transcript models.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::query::QueryResult;

/// Who produced a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// The user's question
    User,
    /// A successful answer
    Assistant,
    /// A failed query
    Error,
}

/// Message body.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    /// Plain text (questions and error messages)
    Text(String),
    /// Generated SQL and its rows
    Result(QueryResult),
}

/// One entry of the chat transcript. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Strictly increasing within a session
    pub id: u64,
    /// Message author
    pub kind: MessageKind,
    /// Message body
    pub content: MessageContent,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a user question.
    pub fn user(id: u64, text: impl Into<String>) -> Self {
        Self::new(id, MessageKind::User, MessageContent::Text(text.into()))
    }

    /// Create an assistant answer.
    pub fn assistant(id: u64, result: QueryResult) -> Self {
        Self::new(id, MessageKind::Assistant, MessageContent::Result(result))
    }

    /// Create an error message.
    pub fn error(id: u64, message: impl Into<String>) -> Self {
        Self::new(id, MessageKind::Error, MessageContent::Text(message.into()))
    }

    fn new(id: u64, kind: MessageKind, content: MessageContent) -> Self {
        Self { id, kind, content, timestamp: Utc::now() }
    }

    /// Text body, if this is not a result.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Result(_) => None,
        }
    }

    /// Result body, if this is an answer.
    pub fn result(&self) -> Option<&QueryResult> {
        match &self.content {
            MessageContent::Result(result) => Some(result),
            MessageContent::Text(_) => None,
        }
    }
}

/// Hands out strictly increasing message ids.
///
/// Ids follow the wall clock in milliseconds so they sort with timestamps,
/// and are bumped past the previous id when two messages share a millisecond.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last: Mutex<u64>,
}

impl MessageIdGenerator {
    /// Create a generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id.
    pub fn next_id(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let mut last = self.last.lock();
        *last = now.max(*last + 1);
        *last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_strictly_increase_within_one_millisecond() {
        let ids = MessageIdGenerator::new();
        let generated: Vec<u64> = (0..1000).map(|_| ids.next_id()).collect();
        assert!(generated.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn accessors_match_content() {
        let question = ChatMessage::user(1, "Show me all users");
        assert_eq!(question.kind, MessageKind::User);
        assert_eq!(question.text(), Some("Show me all users"));
        assert!(question.result().is_none());
    }
}
