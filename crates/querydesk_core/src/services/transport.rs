//! Backend API boundary.
//!
//! Everything the client knows about the backend goes through [`Transport`].
//! [`HttpTransport`](super::HttpTransport) talks to a real server; tests swap
//! in scripted implementations.

use async_trait::async_trait;

use crate::error::QueryDeskResult;
use crate::models::{
    ConnectionInfo, ConnectionRequest, ConnectionStatus, ContextLoadResult, ContextStatus,
    QueryAccepted, QueryStatusResponse, SchemaResponse, Stats,
};

/// HTTP API consumed by the client.
///
/// Implementations map backend error bodies (`{detail}`) onto the error
/// variant that matches the endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `POST /api/connect-db`
    async fn connect(&self, request: &ConnectionRequest) -> QueryDeskResult<ConnectionInfo>;

    /// `POST /api/connect-db/file` (multipart upload)
    async fn connect_file(&self, file_name: &str, contents: Vec<u8>)
        -> QueryDeskResult<ConnectionInfo>;

    /// `GET /api/connection/status`
    async fn connection_status(&self, session_id: &str) -> QueryDeskResult<ConnectionStatus>;

    /// `GET /api/schema`
    async fn schema(&self, session_id: &str) -> QueryDeskResult<SchemaResponse>;

    /// `POST /api/schema/refresh`
    async fn refresh_schema(&self, session_id: &str) -> QueryDeskResult<SchemaResponse>;

    /// `POST /api/query`
    async fn submit_query(&self, query: &str, session_id: &str) -> QueryDeskResult<QueryAccepted>;

    /// `GET /api/query/{id}/status`
    async fn query_status(&self, query_id: &str) -> QueryDeskResult<QueryStatusResponse>;

    /// `POST /api/context/load`
    async fn load_context(&self, session_id: &str) -> QueryDeskResult<ContextLoadResult>;

    /// `GET /api/context/status`
    async fn context_status(&self, session_id: &str) -> QueryDeskResult<ContextStatus>;

    /// `GET /api/system/stats`
    async fn system_stats(&self) -> QueryDeskResult<Stats>;

    /// `POST /api/disconnect`
    async fn disconnect(&self, session_id: &str) -> QueryDeskResult<()>;
}
