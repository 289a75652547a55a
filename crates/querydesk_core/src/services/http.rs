//! reqwest-backed [`Transport`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::Transport;
use crate::config::ClientConfig;
use crate::error::{QueryDeskError, QueryDeskResult};
use crate::models::query::QueryRequest;
use crate::models::{
    ConnectionInfo, ConnectionRequest, ConnectionStatus, ContextLoadResult, ContextStatus,
    QueryAccepted, QueryStatusResponse, SchemaResponse, Stats,
};

/// Header carrying the backend session id.
pub const SESSION_HEADER: &str = "X-Session-ID";

/// Backend operations, used to pick the fallback message and error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Connect,
    ConnectFile,
    ConnectionStatus,
    Schema,
    RefreshSchema,
    SubmitQuery,
    QueryStatus,
    LoadContext,
    ContextStatus,
    SystemStats,
    Disconnect,
}

impl Endpoint {
    /// Message used when the backend gives no `detail`.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::Connect => "Failed to connect to database",
            Self::ConnectFile => "Failed to connect to database file",
            Self::ConnectionStatus => "Failed to get connection status",
            Self::Schema => "Failed to fetch schema",
            Self::RefreshSchema => "Failed to refresh schema",
            Self::SubmitQuery => "Failed to execute query",
            Self::QueryStatus => "Failed to get query status",
            Self::LoadContext => "Failed to load context",
            Self::ContextStatus => "Failed to get context status",
            Self::SystemStats => "Failed to get system stats",
            Self::Disconnect => "Failed to disconnect",
        }
    }

    /// Build the error for a failed call to this endpoint.
    pub fn error(
        self,
        message: impl Into<String>,
        status: Option<u16>,
        source: Option<reqwest::Error>,
    ) -> QueryDeskError {
        let message = message.into();
        match self {
            Self::Connect | Self::ConnectFile | Self::Disconnect => QueryDeskError::connection(message),
            Self::Schema | Self::RefreshSchema => QueryDeskError::schema(message),
            Self::SubmitQuery => QueryDeskError::submission(message),
            Self::LoadContext => QueryDeskError::context_load(message),
            Self::ConnectionStatus | Self::QueryStatus | Self::ContextStatus | Self::SystemStats => {
                QueryDeskError::Transport {
                    message,
                    status,
                    source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
                }
            }
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"detail": "..."}` and the list form validation errors use
/// (`{"detail": [{"msg": "..."}]}`).
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> =
                items.iter().filter_map(|item| item.get("msg").and_then(Value::as_str)).collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

/// Transport talking JSON over HTTP to the backend.
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Create a transport for `config`.
    pub fn new(config: ClientConfig) -> QueryDeskResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| QueryDeskError::transport_with_source("Failed to create HTTP client", e))?;

        tracing::debug!(api_base_url = %config.api_base_url, "HTTP transport created");
        Ok(Self { client, config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.config.endpoint(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.config.endpoint(path))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> QueryDeskResult<T> {
        tracing::debug!(?endpoint, "Sending request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(?endpoint, error = %e, "Request failed");
                return Err(endpoint.error(endpoint.fallback_message(), None, Some(e)));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message =
                extract_detail(&body).unwrap_or_else(|| endpoint.fallback_message().to_string());
            tracing::warn!(?endpoint, status = status.as_u16(), message = %message, "Backend returned an error");
            return Err(endpoint.error(message, Some(status.as_u16()), None));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::warn!(?endpoint, error = %e, "Failed to decode response");
            endpoint.error(endpoint.fallback_message(), Some(status.as_u16()), Some(e))
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn connect(&self, request: &ConnectionRequest) -> QueryDeskResult<ConnectionInfo> {
        self.send(Endpoint::Connect, self.post("/api/connect-db").json(request)).await
    }

    async fn connect_file(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> QueryDeskResult<ConnectionInfo> {
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        self.send(Endpoint::ConnectFile, self.post("/api/connect-db/file").multipart(form)).await
    }

    async fn connection_status(&self, session_id: &str) -> QueryDeskResult<ConnectionStatus> {
        let request = self.get("/api/connection/status").header(SESSION_HEADER, session_id);
        self.send(Endpoint::ConnectionStatus, request).await
    }

    async fn schema(&self, session_id: &str) -> QueryDeskResult<SchemaResponse> {
        let request = self.get("/api/schema").header(SESSION_HEADER, session_id);
        self.send(Endpoint::Schema, request).await
    }

    async fn refresh_schema(&self, session_id: &str) -> QueryDeskResult<SchemaResponse> {
        let request = self
            .post("/api/schema/refresh")
            .header(SESSION_HEADER, session_id)
            .json(&serde_json::json!({}));
        self.send(Endpoint::RefreshSchema, request).await
    }

    async fn submit_query(&self, query: &str, session_id: &str) -> QueryDeskResult<QueryAccepted> {
        let request = self.post("/api/query").json(&QueryRequest { query, session_id });
        self.send(Endpoint::SubmitQuery, request).await
    }

    async fn query_status(&self, query_id: &str) -> QueryDeskResult<QueryStatusResponse> {
        let request = self.get(&format!("/api/query/{query_id}/status"));
        self.send(Endpoint::QueryStatus, request).await
    }

    async fn load_context(&self, session_id: &str) -> QueryDeskResult<ContextLoadResult> {
        let request = self
            .post("/api/context/load")
            .header(SESSION_HEADER, session_id)
            .json(&serde_json::json!({}));
        self.send(Endpoint::LoadContext, request).await
    }

    async fn context_status(&self, session_id: &str) -> QueryDeskResult<ContextStatus> {
        let request = self.get("/api/context/status").header(SESSION_HEADER, session_id);
        self.send(Endpoint::ContextStatus, request).await
    }

    async fn system_stats(&self) -> QueryDeskResult<Stats> {
        self.send(Endpoint::SystemStats, self.get("/api/system/stats")).await
    }

    async fn disconnect(&self, session_id: &str) -> QueryDeskResult<()> {
        let request = self
            .post("/api/disconnect")
            .header(SESSION_HEADER, session_id)
            .json(&serde_json::json!({}));
        let _: Value = self.send(Endpoint::Disconnect, request).await?;
        Ok(())
    }
}
