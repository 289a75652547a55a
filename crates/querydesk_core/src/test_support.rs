//! Scripted backend used by unit and verification tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::time::Instant;

use crate::error::{QueryDeskError, QueryDeskResult};
use crate::models::query::WireStatus;
use crate::models::{
    ColumnSchema, ConnectionInfo, ConnectionRequest, ConnectionStatus, ContextLoadResult,
    ContextStatus, QueryAccepted, QueryResult, QueryStatusResponse, Row, SchemaResponse, Stats,
    TableSchema,
};
use crate::services::Transport;

/// One scripted reply to `GET /api/query/{id}/status`.
pub(crate) enum StatusStep {
    Respond(QueryStatusResponse),
    Fail(String),
}

/// In-memory [`Transport`] with scripted query statuses.
///
/// Status polls pop the script front to back; once it runs dry every poll
/// answers `processing`. Poll instants are recorded on the tokio clock so
/// paused-time tests can check the backoff schedule.
pub(crate) struct ScriptedTransport {
    statuses: Mutex<VecDeque<StatusStep>>,
    poll_times: Mutex<Vec<Instant>>,
    submitted: Mutex<Vec<(String, String)>>,
    uploads: Mutex<Vec<(String, usize)>>,
    submit_delay: Mutex<Option<Duration>>,
    submit_error: Mutex<Option<String>>,
    connect_error: Mutex<Option<String>>,
    tables: Mutex<Vec<TableSchema>>,
    fail_schema: AtomicBool,
    fail_context: AtomicBool,
    fail_stats: AtomicBool,
    fail_disconnect: AtomicBool,
    context_loaded: AtomicBool,
    disconnects: AtomicUsize,
    queries: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            poll_times: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            submit_delay: Mutex::new(None),
            submit_error: Mutex::new(None),
            connect_error: Mutex::new(None),
            tables: Mutex::new(vec![users_table()]),
            fail_schema: AtomicBool::new(false),
            fail_context: AtomicBool::new(false),
            fail_stats: AtomicBool::new(false),
            fail_disconnect: AtomicBool::new(false),
            context_loaded: AtomicBool::new(true),
            disconnects: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
        }
    }

    // ========== Script setup ==========

    pub fn push_status(&self, response: QueryStatusResponse) -> &Self {
        self.statuses.lock().push_back(StatusStep::Respond(response));
        self
    }

    pub fn push_status_error(&self, message: &str) -> &Self {
        self.statuses.lock().push_back(StatusStep::Fail(message.to_string()));
        self
    }

    pub fn push_processing(&self, count: usize, stats: Option<Stats>) -> &Self {
        for _ in 0..count {
            self.push_status(processing(stats));
        }
        self
    }

    pub fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.lock() = Some(delay);
    }

    pub fn set_submit_error(&self, message: &str) {
        *self.submit_error.lock() = Some(message.to_string());
    }

    pub fn set_connect_error(&self, message: &str) {
        *self.connect_error.lock() = Some(message.to_string());
    }

    pub fn set_tables(&self, tables: Vec<TableSchema>) {
        *self.tables.lock() = tables;
    }

    pub fn fail_schema(&self) {
        self.fail_schema.store(true, Ordering::SeqCst);
    }

    pub fn fail_context(&self) {
        self.fail_context.store(true, Ordering::SeqCst);
    }

    pub fn fail_stats(&self) {
        self.fail_stats.store(true, Ordering::SeqCst);
    }

    pub fn fail_disconnect(&self) {
        self.fail_disconnect.store(true, Ordering::SeqCst);
    }

    pub fn set_context_loaded(&self, loaded: bool) {
        self.context_loaded.store(loaded, Ordering::SeqCst);
    }

    // ========== Observations ==========

    pub fn poll_times(&self) -> Vec<Instant> {
        self.poll_times.lock().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.poll_times.lock().len()
    }

    pub fn submitted(&self) -> Vec<(String, String)> {
        self.submitted.lock().clone()
    }

    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().clone()
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&self, request: &ConnectionRequest) -> QueryDeskResult<ConnectionInfo> {
        if let Some(message) = self.connect_error.lock().clone() {
            return Err(QueryDeskError::connection(message));
        }
        let mut info = ConnectionInfo::new(format!("session-{}", request.database));
        info.extra.insert("message".into(), json!("Connected"));
        Ok(info)
    }

    async fn connect_file(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> QueryDeskResult<ConnectionInfo> {
        if let Some(message) = self.connect_error.lock().clone() {
            return Err(QueryDeskError::connection(message));
        }
        self.uploads.lock().push((file_name.to_string(), contents.len()));
        Ok(ConnectionInfo::new(format!("session-{file_name}")))
    }

    async fn connection_status(&self, _session_id: &str) -> QueryDeskResult<ConnectionStatus> {
        Ok(ConnectionStatus { connected: true, extra: Default::default() })
    }

    async fn schema(&self, _session_id: &str) -> QueryDeskResult<SchemaResponse> {
        if self.fail_schema.load(Ordering::SeqCst) {
            return Err(QueryDeskError::schema("Failed to fetch schema"));
        }
        Ok(SchemaResponse { tables: self.tables.lock().clone() })
    }

    async fn refresh_schema(&self, session_id: &str) -> QueryDeskResult<SchemaResponse> {
        self.schema(session_id).await
    }

    async fn submit_query(&self, query: &str, session_id: &str) -> QueryDeskResult<QueryAccepted> {
        let delay = *self.submit_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.submit_error.lock().clone() {
            return Err(QueryDeskError::submission(message));
        }
        self.submitted.lock().push((query.to_string(), session_id.to_string()));
        let n = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(QueryAccepted { query_id: format!("q-{n}") })
    }

    async fn query_status(&self, _query_id: &str) -> QueryDeskResult<QueryStatusResponse> {
        self.poll_times.lock().push(Instant::now());
        let step = self.statuses.lock().pop_front();
        match step {
            Some(StatusStep::Respond(response)) => Ok(response),
            Some(StatusStep::Fail(message)) => Err(QueryDeskError::transport(message, Some(500))),
            None => Ok(processing(None)),
        }
    }

    async fn load_context(&self, _session_id: &str) -> QueryDeskResult<ContextLoadResult> {
        if self.fail_context.load(Ordering::SeqCst) {
            return Err(QueryDeskError::context_load("Failed to load context"));
        }
        self.context_loaded.store(true, Ordering::SeqCst);
        Ok(ContextLoadResult {
            success: true,
            message: "Context loaded".into(),
            tables_count: Some(self.tables.lock().len() as u32),
            sample_results: None,
        })
    }

    async fn context_status(&self, _session_id: &str) -> QueryDeskResult<ContextStatus> {
        if self.fail_context.load(Ordering::SeqCst) {
            return Err(QueryDeskError::transport("Failed to get context status", Some(503)));
        }
        let loaded = self.context_loaded.load(Ordering::SeqCst);
        let message = if loaded { "Context loaded" } else { "Context not loaded" };
        Ok(ContextStatus { loaded, message: message.into() })
    }

    async fn system_stats(&self) -> QueryDeskResult<Stats> {
        if self.fail_stats.load(Ordering::SeqCst) {
            return Err(QueryDeskError::transport("Failed to get system stats", Some(502)));
        }
        Ok(stats(2, 1))
    }

    async fn disconnect(&self, _session_id: &str) -> QueryDeskResult<()> {
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(QueryDeskError::connection("Failed to disconnect"));
        }
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ========== Fixtures ==========

pub(crate) fn stats(queued: u64, processing: u64) -> Stats {
    Stats { active_sessions: 1, total_queries: 7, queued, processing, queue_size: queued, ..Stats::default() }
}

pub(crate) fn processing(stats: Option<Stats>) -> QueryStatusResponse {
    QueryStatusResponse { status: WireStatus::Processing, result: None, error: None, stats }
}

pub(crate) fn queued(stats: Option<Stats>) -> QueryStatusResponse {
    QueryStatusResponse { status: WireStatus::Queued, result: None, error: None, stats }
}

pub(crate) fn completed(result: QueryResult, stats: Option<Stats>) -> QueryStatusResponse {
    QueryStatusResponse { status: WireStatus::Completed, result: Some(result), error: None, stats }
}

pub(crate) fn failed(error: Option<&str>) -> QueryStatusResponse {
    QueryStatusResponse {
        status: WireStatus::Failed,
        result: None,
        error: error.map(String::from),
        stats: None,
    }
}

pub(crate) fn user_count_result() -> QueryResult {
    let mut row = Row::new();
    row.insert("count".into(), json!(42));
    QueryResult {
        sql: "SELECT COUNT(*) AS count FROM users".into(),
        results: vec![row],
        execution_time_seconds: 0.012,
    }
}

pub(crate) fn users_table() -> TableSchema {
    TableSchema {
        name: "users".into(),
        columns: vec![
            ColumnSchema {
                name: "id".into(),
                data_type: "INTEGER".into(),
                primary_key: true,
                foreign_key: None,
            },
            ColumnSchema {
                name: "email".into(),
                data_type: "TEXT".into(),
                primary_key: false,
                foreign_key: None,
            },
        ],
    }
}
