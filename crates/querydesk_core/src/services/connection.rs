//! Database session lifecycle.
//!
//! Connecting goes through the backend, which returns a session id; every
//! later call is scoped by that id. Outcomes land in the store's connection
//! slot, and a successful connect immediately loads the schema.

use std::path::Path;
use std::sync::Arc;

use super::schema::SchemaService;
use super::transport::Transport;
use crate::error::{QueryDeskError, QueryDeskResult};
use crate::models::{ConnectionInfo, ConnectionRequest};
use crate::state::{Action, Store};

/// Connection service.
#[derive(Clone)]
pub struct ConnectionService {
    transport: Arc<dyn Transport>,
    store: Store,
    schema: SchemaService,
}

impl ConnectionService {
    /// Create a connection service.
    pub fn new(transport: Arc<dyn Transport>, store: Store) -> Self {
        let schema = SchemaService::new(transport.clone(), store.clone());
        Self { transport, store, schema }
    }

    /// Connect with credentials.
    pub async fn connect(&self, request: &ConnectionRequest) -> QueryDeskResult<ConnectionInfo> {
        tracing::debug!(
            host = %request.host,
            port = request.port,
            database = %request.database,
            db_type = request.db_type.as_str(),
            "Connecting to database"
        );

        self.store.dispatch(Action::SetConnectionLoading(true));
        let result = self.transport.connect(request).await;
        self.finish_connect(result).await
    }

    /// Connect to a database file (e.g. SQLite) by uploading it.
    pub async fn connect_file(&self, path: &Path) -> QueryDeskResult<ConnectionInfo> {
        tracing::debug!(path = %path.display(), "Connecting to database file");
        self.store.dispatch(Action::SetConnectionLoading(true));

        let contents = match tokio::fs::read(path).await {
            Ok(contents) => contents,
            Err(e) => {
                let err = QueryDeskError::connection(format!(
                    "Failed to read {}: {e}",
                    path.display()
                ));
                return self.finish_connect(Err(err)).await;
            }
        };

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "database.db".to_string());

        let result = self.transport.connect_file(&file_name, contents).await;
        self.finish_connect(result).await
    }

    async fn finish_connect(
        &self,
        result: QueryDeskResult<ConnectionInfo>,
    ) -> QueryDeskResult<ConnectionInfo> {
        let info = match result {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(error = %e, "Connection failed");
                self.store.dispatch(Action::SetConnectionError(e.to_string()));
                return Err(e);
            }
        };

        tracing::info!(session_id = %info.session_id, "Connected");
        self.store.dispatch(Action::SetConnectionSuccess(info.clone()));

        // Schema failures are recorded in the schema slot; the session stays up
        let _ = self.schema.load(&info.session_id).await;

        Ok(info)
    }

    /// Close the current session and reset all state.
    pub async fn disconnect(&self) -> QueryDeskResult<()> {
        let Some(session_id) = self.store.session_id() else {
            self.store.dispatch(Action::DisconnectDatabase);
            return Ok(());
        };

        match self.transport.disconnect(&session_id).await {
            Ok(()) => {
                tracing::info!(session_id = %session_id, "Disconnected");
                self.store.dispatch(Action::DisconnectDatabase);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Disconnect failed");
                self.store.dispatch(Action::SetConnectionError(e.to_string()));
                Err(e)
            }
        }
    }

    /// Ask the backend whether the current session is still connected.
    ///
    /// Returns false when there is no session or the backend cannot be asked.
    pub async fn check_connection(&self) -> bool {
        let Some(session_id) = self.store.session_id() else {
            return false;
        };

        match self.transport.connection_status(&session_id).await {
            Ok(status) => status.connected,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Failed to get connection status");
                false
            }
        }
    }

    /// Schema service bound to the same store.
    pub fn schema(&self) -> &SchemaService {
        &self.schema
    }
}
