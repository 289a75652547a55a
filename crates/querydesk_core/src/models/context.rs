//! Model context (backend-side loaded schema) models.

use serde::{Deserialize, Serialize};

use super::query::Row;

/// Response of `GET /api/context/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStatus {
    /// Whether the backend has model context for the session
    #[serde(default)]
    pub loaded: bool,
    /// Human-readable status
    #[serde(default)]
    pub message: String,
}

impl ContextStatus {
    /// Status reported when the backend could not be asked.
    pub fn not_loaded(message: impl Into<String>) -> Self {
        Self { loaded: false, message: message.into() }
    }
}

/// Sample query the backend ran against one table while loading context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    /// Table sampled
    pub table: String,
    /// SQL used for the sample
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    /// Sampled rows
    #[serde(default)]
    pub results: Vec<Row>,
    /// Execution time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    /// Error raised while sampling this table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `POST /api/context/load`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextLoadResult {
    /// Whether context was loaded
    pub success: bool,
    /// Human-readable outcome
    #[serde(default)]
    pub message: String,
    /// Number of tables included in the context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables_count: Option<u32>,
    /// Per-table sample queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_results: Option<Vec<SampleResult>>,
}

impl ContextLoadResult {
    /// Outcome reported when loading failed.
    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), tables_count: None, sample_results: None }
    }
}
