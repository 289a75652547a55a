//! Error types for QueryDesk.
//!
//! Every failure the client can observe maps onto one [`QueryDeskError`]
//! variant. None of them are fatal: callers either surface the message in the
//! relevant state slot or turn it into an error chat message.

use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type QueryDeskResult<T> = Result<T, QueryDeskError>;

/// Main error type for QueryDesk.
#[derive(Debug, Error)]
pub enum QueryDeskError {
    /// The backend did not accept a query job (network or validation).
    #[error("{message}")]
    Submission {
        /// Human-readable error message.
        message: String,
    },

    /// The backend reported that the query job failed.
    #[error("{message}")]
    QueryFailed {
        /// Server-supplied message, or a generic fallback.
        message: String,
        /// Backend job identifier.
        query_id: String,
    },

    /// No terminal state was reached before the overall deadline.
    #[error("Query timed out after {} seconds", elapsed.as_secs())]
    QueryTimeout {
        /// Backend job identifier, if the job was accepted.
        query_id: Option<String>,
        /// Time spent waiting.
        elapsed: Duration,
    },

    /// The query was cancelled by the client.
    #[error("Query cancelled")]
    QueryCancelled {
        /// Backend job identifier, if the job was accepted.
        query_id: Option<String>,
    },

    /// Connecting to or disconnecting from the database failed.
    #[error("{message}")]
    Connection {
        /// Human-readable error message.
        message: String,
    },

    /// Fetching or refreshing the schema failed.
    #[error("{message}")]
    Schema {
        /// Human-readable error message.
        message: String,
    },

    /// Loading the model context failed.
    #[error("{message}")]
    ContextLoad {
        /// Human-readable error message.
        message: String,
    },

    /// Generic network or backend failure.
    #[error("{message}")]
    Transport {
        /// Human-readable error message.
        message: String,
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid client configuration.
    #[error("Config error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// Unexpected internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
    },
}

impl QueryDeskError {
    // ========== Constructors ==========

    /// Create a submission error.
    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission { message: message.into() }
    }

    /// Create a query failure reported by the backend.
    pub fn query_failed(query_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueryFailed { message: message.into(), query_id: query_id.into() }
    }

    /// Create a client-side timeout error.
    pub fn query_timeout(query_id: Option<String>, elapsed: Duration) -> Self {
        Self::QueryTimeout { query_id, elapsed }
    }

    /// Create a query cancelled error.
    pub fn query_cancelled(query_id: Option<String>) -> Self {
        Self::QueryCancelled { query_id }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into() }
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema { message: message.into() }
    }

    /// Create a context load error.
    pub fn context_load(message: impl Into<String>) -> Self {
        Self::ContextLoad { message: message.into() }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Transport { message: message.into(), status, source: None }
    }

    /// Create a transport error with source.
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport { message: message.into(), status: None, source: Some(Box::new(source)) }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    // ========== Methods ==========

    /// Check if this error represents a cancelled query.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::QueryCancelled { .. })
    }

    /// Check if this error represents a client-side timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::QueryTimeout { .. })
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Submission { .. } => "Submission",
            Self::QueryFailed { .. } => "Query",
            Self::QueryTimeout { .. } => "Timeout",
            Self::QueryCancelled { .. } => "Query",
            Self::Connection { .. } => "Connection",
            Self::Schema { .. } => "Schema",
            Self::ContextLoad { .. } => "Context",
            Self::Transport { .. } => "Transport",
            Self::Config { .. } => "Config",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Get actionable hint for the user.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Submission { .. } => Some("Check that the backend is reachable"),
            Self::QueryFailed { .. } => Some("Try rephrasing the question"),
            Self::QueryTimeout { .. } => Some("The backend may be overloaded; try again later"),
            Self::QueryCancelled { .. } => None,
            Self::Connection { .. } => Some("Check the connection details and that the database is running"),
            Self::Schema { .. } => Some("Try refreshing the schema"),
            Self::ContextLoad { .. } => None,
            Self::Transport { .. } => Some("Check that the backend is reachable"),
            Self::Config { .. } => None,
            Self::Internal { .. } => Some("Please report this issue"),
        }
    }

    /// Convert to user-displayable error info.
    pub fn to_error_info(&self) -> ErrorInfo {
        let error_type = format!("{} Error", self.category());
        let message = self.to_string();
        let hint = self.hint().map(String::from);

        let technical_detail = match self {
            Self::QueryFailed { query_id, .. } => Some(format!("Query ID: {query_id}")),
            Self::QueryTimeout { query_id: Some(query_id), .. } => {
                Some(format!("Query ID: {query_id}"))
            }
            Self::Transport { status: Some(status), .. } => Some(format!("HTTP status: {status}")),
            _ => None,
        };

        ErrorInfo { error_type, message, hint, technical_detail }
    }
}

/// User-displayable error information.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Category name (e.g., "Connection Error").
    pub error_type: String,
    /// User-friendly message.
    pub message: String,
    /// Actionable suggestion.
    pub hint: Option<String>,
    /// Technical detail for "Show Details" expansion.
    pub technical_detail: Option<String>,
}
