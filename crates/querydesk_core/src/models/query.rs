//! Query job models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One result row: column name to value, in the order the backend sent them.
pub type Row = Map<String, Value>;

/// Body of `POST /api/query`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct QueryRequest<'a> {
    pub query: &'a str,
    pub session_id: &'a str,
}

/// Response of `POST /api/query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAccepted {
    /// Backend job identifier
    pub query_id: String,
}

/// A query job accepted by the backend. Identifies one polling lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySubmission {
    /// Backend job identifier
    pub query_id: String,
    /// The natural-language question
    pub text: String,
    /// Session the job runs against
    pub session_id: String,
    /// When the backend accepted the job
    pub submitted_at: DateTime<Utc>,
}

impl QuerySubmission {
    /// Create a submission stamped with the current time.
    pub fn new(
        query_id: impl Into<String>,
        text: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            query_id: query_id.into(),
            text: text.into(),
            session_id: session_id.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Generated SQL and the rows it returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// SQL generated from the question
    pub sql: String,
    /// Result rows
    #[serde(default)]
    pub results: Vec<Row>,
    /// Backend execution time in seconds
    #[serde(rename = "execution_time", default)]
    pub execution_time_seconds: f64,
}

impl QueryResult {
    /// Get the number of rows returned.
    pub fn row_count(&self) -> usize {
        self.results.len()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Column names, taken from the first row.
    pub fn column_names(&self) -> Vec<&str> {
        self.results
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Backend queue statistics. A point-in-time snapshot that replaces any
/// previous one wholesale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Sessions currently open on the backend
    pub active_sessions: u64,
    /// Queries received since the backend started
    pub total_queries: u64,
    /// Jobs waiting in the queue
    pub queued: u64,
    /// Jobs being worked on
    pub processing: u64,
    /// Jobs finished successfully
    pub completed: u64,
    /// Jobs that failed
    pub failed: u64,
    /// Current queue depth
    pub queue_size: u64,
}

/// Coarse load classification of a [`Stats`] snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemHealth {
    /// Fewer than 5 jobs processing and fewer than 10 queued
    Healthy,
    /// The backend is under load
    Busy,
}

impl Stats {
    /// Classify the snapshot.
    pub fn health(&self) -> SystemHealth {
        if self.processing < 5 && self.queued < 10 {
            SystemHealth::Healthy
        } else {
            SystemHealth::Busy
        }
    }

    /// Whether the backend has no work in flight.
    pub fn is_idle(&self) -> bool {
        self.processing == 0 && self.queued == 0
    }
}

/// Job state as spelled on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// Response of `GET /api/query/{id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStatusResponse {
    /// Job state
    pub status: WireStatus,
    /// Present once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<QueryResult>,
    /// Present once failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Fresh queue statistics, if the backend attached them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

impl QueryStatusResponse {
    /// Split into the job state and the optional stats snapshot.
    pub fn into_parts(self) -> (QueryStatus, Option<Stats>) {
        let status = match self.status {
            WireStatus::Queued => QueryStatus::Queued,
            WireStatus::Processing => QueryStatus::Processing,
            WireStatus::Completed => match self.result {
                Some(result) => QueryStatus::Completed(result),
                None => QueryStatus::Failed(Some("Query completed without a result".to_string())),
            },
            WireStatus::Failed => QueryStatus::Failed(self.error.filter(|e| !e.trim().is_empty())),
        };
        (status, self.stats)
    }
}

/// Lifecycle state of a query job.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryStatus {
    /// Waiting in the backend queue
    Queued,
    /// Being translated or executed
    Processing,
    /// Finished with a result
    Completed(QueryResult),
    /// Finished with an optional server-supplied message
    Failed(Option<String>),
    /// Client gave up waiting; never reported by the backend
    TimedOut,
}

impl QueryStatus {
    /// Whether polling stops at this state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued | Self::Processing)
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_status_carries_result_and_stats() {
        let response: QueryStatusResponse = serde_json::from_str(
            r#"{
                "status": "completed",
                "result": {"sql": "SELECT * FROM users", "results": [{"id": 1, "name": "Ann"}], "execution_time": 0.02},
                "stats": {"queued": 2, "processing": 1}
            }"#,
        )
        .unwrap();

        let (status, stats) = response.into_parts();
        let QueryStatus::Completed(result) = status else {
            panic!("expected completed, got {status:?}");
        };
        assert_eq!(result.sql, "SELECT * FROM users");
        assert_eq!(result.column_names(), ["id", "name"]);
        assert_eq!(result.execution_time_seconds, 0.02);

        let stats = stats.unwrap();
        assert_eq!(stats.queued, 2);
        assert_eq!(stats.completed, 0);
    }

    #[test]
    fn failed_status_drops_blank_message() {
        let response: QueryStatusResponse =
            serde_json::from_str(r#"{"status":"failed","error":"  "}"#).unwrap();
        assert_eq!(response.into_parts().0, QueryStatus::Failed(None));
    }

    #[test]
    fn completed_without_result_is_a_failure() {
        let response: QueryStatusResponse =
            serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        assert!(matches!(response.into_parts().0, QueryStatus::Failed(Some(_))));
    }

    #[test]
    fn only_queued_and_processing_are_non_terminal() {
        assert!(!QueryStatus::Queued.is_terminal());
        assert!(!QueryStatus::Processing.is_terminal());
        assert!(QueryStatus::Failed(None).is_terminal());
        assert!(QueryStatus::TimedOut.is_terminal());
    }

    #[test]
    fn health_thresholds() {
        assert_eq!(Stats::default().health(), SystemHealth::Healthy);
        assert_eq!(Stats { processing: 5, ..Stats::default() }.health(), SystemHealth::Busy);
        assert_eq!(Stats { queued: 10, ..Stats::default() }.health(), SystemHealth::Busy);
        assert_eq!(Stats { processing: 4, queued: 9, ..Stats::default() }.health(), SystemHealth::Healthy);
    }
}
