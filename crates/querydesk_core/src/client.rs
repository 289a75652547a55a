//! Client facade.
//!
//! One [`QueryDeskClient`] per user session: it owns the store and the
//! services that write to it, and is passed by reference to whatever renders
//! the state.

use std::path::Path;
use std::sync::Arc;

use crate::config::{ClientConfig, PollConfig};
use crate::error::QueryDeskResult;
use crate::models::{
    ConnectionInfo, ConnectionRequest, ContextLoadResult, ContextStatus, QueryResult, Stats,
    TableSchema,
};
use crate::services::{
    ChatSession, ConnectionService, ContextStatusMonitor, HttpTransport, ProgressCallback,
    QueryOrchestrator, StatsService, Transport,
};
use crate::state::Store;

/// Entry point tying the store to the backend.
pub struct QueryDeskClient {
    store: Store,
    connection: ConnectionService,
    chat: ChatSession,
    context: ContextStatusMonitor,
    stats: StatsService,
}

impl QueryDeskClient {
    /// Create a client talking HTTP to the configured backend.
    pub fn new(config: ClientConfig) -> QueryDeskResult<Self> {
        let poll = config.poll.clone();
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(transport, poll))
    }

    /// Create a client on top of any transport.
    pub fn with_transport(transport: Arc<dyn Transport>, poll: PollConfig) -> Self {
        let store = Store::new();
        let orchestrator = QueryOrchestrator::new(transport.clone(), poll);

        tracing::debug!("QueryDesk client initialized");

        Self {
            connection: ConnectionService::new(transport.clone(), store.clone()),
            chat: ChatSession::new(store.clone(), orchestrator),
            context: ContextStatusMonitor::new(transport.clone()),
            stats: StatsService::new(transport),
            store,
        }
    }

    // ========== Accessors ==========

    /// The state store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The chat session.
    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// The connection service.
    pub fn connection(&self) -> &ConnectionService {
        &self.connection
    }

    /// Forward queue statistics from every poll to `callback`.
    pub fn on_progress(&self, callback: ProgressCallback) {
        self.chat.set_progress_callback(callback);
    }

    // ========== Operations ==========

    /// Connect with credentials, abandoning any outstanding query.
    pub async fn connect(&self, request: &ConnectionRequest) -> QueryDeskResult<ConnectionInfo> {
        self.chat.cancel();
        self.connection.connect(request).await
    }

    /// Connect to an uploaded database file, abandoning any outstanding query.
    pub async fn connect_file(&self, path: &Path) -> QueryDeskResult<ConnectionInfo> {
        self.chat.cancel();
        self.connection.connect_file(path).await
    }

    /// Close the session and reset all state.
    pub async fn disconnect(&self) -> QueryDeskResult<()> {
        self.chat.cancel();
        self.connection.disconnect().await
    }

    /// Ask a question against the current session.
    pub async fn ask(&self, text: &str) -> QueryDeskResult<QueryResult> {
        self.chat.submit(text).await
    }

    /// Re-read the schema of the current session.
    pub async fn refresh_schema(&self) -> QueryDeskResult<Vec<TableSchema>> {
        self.connection.schema().refresh().await
    }

    /// Whether the backend has model context for the current session.
    pub async fn context_status(&self) -> ContextStatus {
        match self.store.session_id() {
            Some(session_id) => self.context.check_status(&session_id).await,
            None => ContextStatus::not_loaded("Not connected to a database"),
        }
    }

    /// Load model context for the current session.
    pub async fn load_context(&self) -> ContextLoadResult {
        match self.store.session_id() {
            Some(session_id) => self.context.load(&session_id).await,
            None => ContextLoadResult::failed("Not connected to a database"),
        }
    }

    /// Current backend statistics (zeros when unreachable).
    pub async fn system_stats(&self) -> Stats {
        self.stats.fetch().await
    }
}
