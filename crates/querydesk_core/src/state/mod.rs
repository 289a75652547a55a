//! Application state management.
//!
//! A single [`ApplicationState`] per client session, owned by a [`Store`] and
//! changed only by dispatching [`Action`]s through the pure [`reduce`]
//! function.

mod action;
mod reducer;
mod store;

pub use action::Action;
pub use reducer::reduce;
pub use store::{Observer, Store, SubscriptionId};

use crate::models::{ChatMessage, ConnectionInfo, HistoryEntry, TableSchema};

/// Connection lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionState {
    /// Whether a session is established
    pub is_connected: bool,
    /// Backend response for the current session
    pub config: Option<ConnectionInfo>,
    /// Last connection error
    pub error: Option<String>,
    /// Connect or disconnect in progress
    pub loading: bool,
}

/// Schema of the connected database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaState {
    /// Tables, replaced wholesale on every load
    pub tables: Vec<TableSchema>,
    /// Load in progress
    pub loading: bool,
    /// Last schema error
    pub error: Option<String>,
}

/// Chat transcript.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    /// Messages in id order
    pub messages: Vec<ChatMessage>,
    /// True while exactly one query is outstanding
    pub loading: bool,
    /// Last query error
    pub error: Option<String>,
}

/// Everything the front end renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationState {
    /// Connection domain
    pub connection: ConnectionState,
    /// Schema domain
    pub schema: SchemaState,
    /// Chat domain
    pub chat: ChatState,
    /// Recent questions, newest first
    pub history: Vec<HistoryEntry>,
}

impl ApplicationState {
    /// Session id of the current connection.
    pub fn session_id(&self) -> Option<&str> {
        self.connection.config.as_ref().map(|c| c.session_id.as_str())
    }

    /// Whether a session is established.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected
    }
}
