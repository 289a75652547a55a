//! Schema loading.
//!
//! Fetches the table list for a session and records the outcome in the
//! store's schema slot. Failures never propagate past the store.

use std::sync::Arc;

use super::transport::Transport;
use crate::error::{QueryDeskError, QueryDeskResult};
use crate::models::TableSchema;
use crate::state::{Action, Store};

/// Schema service.
#[derive(Clone)]
pub struct SchemaService {
    transport: Arc<dyn Transport>,
    store: Store,
}

impl SchemaService {
    /// Create a schema service.
    pub fn new(transport: Arc<dyn Transport>, store: Store) -> Self {
        Self { transport, store }
    }

    /// Load the schema for `session_id`.
    pub async fn load(&self, session_id: &str) -> QueryDeskResult<Vec<TableSchema>> {
        self.store.dispatch(Action::SetSchemaLoading(true));
        let result = self.transport.schema(session_id).await;
        self.apply(session_id, result.map(|schema| schema.tables))
    }

    /// Ask the backend to re-read the schema of the current session.
    pub async fn refresh(&self) -> QueryDeskResult<Vec<TableSchema>> {
        let Some(session_id) = self.store.session_id() else {
            let err = QueryDeskError::schema("Not connected to a database");
            self.store.dispatch(Action::SetSchemaError(err.to_string()));
            return Err(err);
        };

        self.store.dispatch(Action::SetSchemaLoading(true));
        let result = self.transport.refresh_schema(&session_id).await;
        self.apply(&session_id, result.map(|schema| schema.tables))
    }

    fn apply(
        &self,
        session_id: &str,
        result: QueryDeskResult<Vec<TableSchema>>,
    ) -> QueryDeskResult<Vec<TableSchema>> {
        match result {
            Ok(tables) => {
                tracing::debug!(session_id, table_count = tables.len(), "Schema loaded");
                self.store.dispatch(Action::SetSchemaSuccess(tables.clone()));
                Ok(tables)
            }
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Failed to load schema");
                self.store.dispatch(Action::SetSchemaError(e.to_string()));
                Err(e)
            }
        }
    }
}
