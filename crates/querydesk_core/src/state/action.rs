//! Actions accepted by the store.

use crate::models::{ChatMessage, ConnectionInfo, HistoryEntry, TableSchema};

/// A state transition request.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Set `connection.loading` and clear `connection.error`
    SetConnectionLoading(bool),
    /// Mark the session as connected
    SetConnectionSuccess(ConnectionInfo),
    /// Mark the session as failed
    SetConnectionError(String),
    /// Set `schema.loading`
    SetSchemaLoading(bool),
    /// Replace the table list
    SetSchemaSuccess(Vec<TableSchema>),
    /// Record a schema error
    SetSchemaError(String),
    /// Append a chat message
    AddMessage(ChatMessage),
    /// Set `chat.loading`
    SetChatLoading(bool),
    /// Record a query error
    SetChatError(String),
    /// Prepend a history entry
    AddToHistory(HistoryEntry),
    /// Empty the transcript
    ClearChat,
    /// Reset to the initial state
    DisconnectDatabase,
    /// Action from a newer front end this store does not know; ignored
    Unknown(String),
}

impl Action {
    /// Stable name for logging.
    pub fn name(&self) -> &str {
        match self {
            Self::SetConnectionLoading(_) => "SET_CONNECTION_LOADING",
            Self::SetConnectionSuccess(_) => "SET_CONNECTION_SUCCESS",
            Self::SetConnectionError(_) => "SET_CONNECTION_ERROR",
            Self::SetSchemaLoading(_) => "SET_SCHEMA_LOADING",
            Self::SetSchemaSuccess(_) => "SET_SCHEMA_SUCCESS",
            Self::SetSchemaError(_) => "SET_SCHEMA_ERROR",
            Self::AddMessage(_) => "ADD_MESSAGE",
            Self::SetChatLoading(_) => "SET_CHAT_LOADING",
            Self::SetChatError(_) => "SET_CHAT_ERROR",
            Self::AddToHistory(_) => "ADD_TO_HISTORY",
            Self::ClearChat => "CLEAR_CHAT",
            Self::DisconnectDatabase => "DISCONNECT_DATABASE",
            Self::Unknown(name) => name,
        }
    }
}
