//! The state transition function.

use super::{Action, ApplicationState, ChatState, ConnectionState, SchemaState};
use crate::models::history::HISTORY_LIMIT;

/// Apply `action` to `state`, returning the next state.
///
/// Pure: the same inputs always produce the same output and nothing outside
/// the returned value is touched.
pub fn reduce(state: &ApplicationState, action: &Action) -> ApplicationState {
    let mut next = state.clone();

    match action {
        Action::SetConnectionLoading(loading) => {
            next.connection.loading = *loading;
            next.connection.error = None;
        }
        Action::SetConnectionSuccess(info) => {
            next.connection = ConnectionState {
                is_connected: true,
                config: Some(info.clone()),
                error: None,
                loading: false,
            };
        }
        Action::SetConnectionError(message) => {
            next.connection.is_connected = false;
            next.connection.loading = false;
            next.connection.error = Some(message.clone());
        }
        Action::SetSchemaLoading(loading) => {
            next.schema.loading = *loading;
        }
        Action::SetSchemaSuccess(tables) => {
            next.schema = SchemaState { tables: tables.clone(), loading: false, error: None };
        }
        Action::SetSchemaError(message) => {
            next.schema.loading = false;
            next.schema.error = Some(message.clone());
        }
        Action::AddMessage(message) => {
            // Ids must keep increasing; a stale or duplicate id is dropped
            let accepts = next.chat.messages.last().map_or(true, |last| message.id > last.id);
            if accepts {
                next.chat.messages.push(message.clone());
            }
        }
        Action::SetChatLoading(loading) => {
            next.chat.loading = *loading;
        }
        Action::SetChatError(message) => {
            next.chat.loading = false;
            next.chat.error = Some(message.clone());
        }
        Action::AddToHistory(entry) => {
            next.history.insert(0, entry.clone());
            next.history.truncate(HISTORY_LIMIT);
        }
        Action::ClearChat => {
            next.chat = ChatState::default();
        }
        Action::DisconnectDatabase => {
            next = ApplicationState::default();
        }
        Action::Unknown(_) => {}
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMessage, ColumnSchema, ConnectionInfo, HistoryEntry, TableSchema};

    fn users_table() -> TableSchema {
        TableSchema {
            name: "users".into(),
            columns: vec![ColumnSchema {
                name: "id".into(),
                data_type: "INTEGER".into(),
                primary_key: true,
                foreign_key: None,
            }],
        }
    }

    #[test]
    fn connection_loading_clears_error() {
        let failed = reduce(&ApplicationState::default(), &Action::SetConnectionError("boom".into()));
        assert_eq!(failed.connection.error.as_deref(), Some("boom"));

        let retry = reduce(&failed, &Action::SetConnectionLoading(true));
        assert!(retry.connection.loading);
        assert!(retry.connection.error.is_none());
    }

    #[test]
    fn connection_success_replaces_slot() {
        let loading = reduce(&ApplicationState::default(), &Action::SetConnectionLoading(true));
        let next = reduce(&loading, &Action::SetConnectionSuccess(ConnectionInfo::new("abc")));

        assert_eq!(
            next.connection,
            ConnectionState {
                is_connected: true,
                config: Some(ConnectionInfo::new("abc")),
                error: None,
                loading: false,
            }
        );
        assert_eq!(next.session_id(), Some("abc"));
    }

    #[test]
    fn connection_error_keeps_config() {
        let connected = reduce(
            &ApplicationState::default(),
            &Action::SetConnectionSuccess(ConnectionInfo::new("abc")),
        );
        let next = reduce(&connected, &Action::SetConnectionError("lost".into()));

        assert!(!next.connection.is_connected);
        assert!(!next.connection.loading);
        assert_eq!(next.connection.config, Some(ConnectionInfo::new("abc")));
    }

    #[test]
    fn schema_transitions() {
        let loading = reduce(&ApplicationState::default(), &Action::SetSchemaLoading(true));
        assert!(loading.schema.loading);

        let failed = reduce(&loading, &Action::SetSchemaError("no access".into()));
        assert!(!failed.schema.loading);
        assert_eq!(failed.schema.error.as_deref(), Some("no access"));

        let loaded = reduce(&failed, &Action::SetSchemaSuccess(vec![users_table()]));
        assert_eq!(loaded.schema, SchemaState { tables: vec![users_table()], loading: false, error: None });
    }

    #[test]
    fn messages_are_append_only_with_increasing_ids() {
        let mut state = ApplicationState::default();
        state = reduce(&state, &Action::AddMessage(ChatMessage::user(10, "first")));
        state = reduce(&state, &Action::AddMessage(ChatMessage::user(11, "second")));
        state = reduce(&state, &Action::AddMessage(ChatMessage::user(11, "duplicate")));
        state = reduce(&state, &Action::AddMessage(ChatMessage::user(5, "stale")));

        let ids: Vec<u64> = state.chat.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, [10, 11]);
    }

    #[test]
    fn chat_error_clears_loading() {
        let loading = reduce(&ApplicationState::default(), &Action::SetChatLoading(true));
        let failed = reduce(&loading, &Action::SetChatError("bad".into()));
        assert!(!failed.chat.loading);
        assert_eq!(failed.chat.error.as_deref(), Some("bad"));
    }

    #[test]
    fn clear_chat_keeps_other_domains() {
        let mut state = reduce(
            &ApplicationState::default(),
            &Action::SetConnectionSuccess(ConnectionInfo::new("abc")),
        );
        state = reduce(&state, &Action::AddMessage(ChatMessage::user(1, "hi")));
        state = reduce(&state, &Action::SetChatError("bad".into()));
        state = reduce(&state, &Action::AddToHistory(HistoryEntry::new("hi")));

        let cleared = reduce(&state, &Action::ClearChat);
        assert_eq!(cleared.chat, ChatState::default());
        assert_eq!(cleared.history.len(), 1);
        assert!(cleared.is_connected());
    }

    #[test]
    fn unknown_action_is_a_no_op() {
        let state = reduce(
            &ApplicationState::default(),
            &Action::SetConnectionSuccess(ConnectionInfo::new("abc")),
        );
        let next = reduce(&state, &Action::Unknown("SET_THEME".into()));
        assert_eq!(next, state);
    }
}
