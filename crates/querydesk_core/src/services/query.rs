//! Query orchestration with backoff, deadline and cancellation.
//!
//! Provides:
//! - Job submission and sequential status polling
//! - Adaptive backoff between polls (see [`PollConfig::interval_for`])
//! - A hard deadline measured from the start of the call
//! - Cancellation via tokio-util CancellationToken
//! - Live queue statistics forwarded to a progress callback on every poll

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::select;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use super::transport::Transport;
use crate::config::PollConfig;
use crate::error::{QueryDeskError, QueryDeskResult};
use crate::models::{QueryResult, QueryStatus, QuerySubmission, Stats};

/// Generic message for a failed job that carries no error text.
const QUERY_FAILED_FALLBACK: &str = "Query failed";

/// Receives every stats snapshot a poll response carries.
pub type ProgressCallback = Arc<dyn Fn(&Stats) + Send + Sync>;

/// State of one polling lifecycle.
#[derive(Debug)]
struct PollState {
    submission: QuerySubmission,
    attempt: u32,
    status: QueryStatus,
}

impl PollState {
    fn new(submission: QuerySubmission) -> Self {
        Self { submission, attempt: 0, status: QueryStatus::Queued }
    }

    fn query_id(&self) -> &str {
        &self.submission.query_id
    }
}

/// Handle for a query running in the background.
///
/// Dropping the handle does not stop the query; call [`QueryHandle::cancel`].
pub struct QueryHandle {
    text: String,
    started_at: DateTime<Utc>,
    cancel_token: CancellationToken,
    task: JoinHandle<QueryDeskResult<QueryResult>>,
}

impl QueryHandle {
    /// The submitted question.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get when the call started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Request cancellation. Pending timers are dropped and nothing further
    /// is reported to the progress callback.
    pub fn cancel(&self) {
        tracing::debug!("Query cancellation requested");
        self.cancel_token.cancel();
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Get a clone of the cancellation token.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Wait for the query to settle.
    pub async fn wait(self) -> QueryDeskResult<QueryResult> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(QueryDeskError::query_cancelled(None)),
            Err(e) => Err(QueryDeskError::internal(format!("Query task failed: {e}"))),
        }
    }
}

impl std::fmt::Debug for QueryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHandle")
            .field("text", &self.text)
            .field("started_at", &self.started_at)
            .field("is_cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Submits query jobs and polls them to a terminal state.
#[derive(Clone)]
pub struct QueryOrchestrator {
    transport: Arc<dyn Transport>,
    poll: PollConfig,
}

impl QueryOrchestrator {
    /// Create an orchestrator using `poll` as its schedule.
    pub fn new(transport: Arc<dyn Transport>, poll: PollConfig) -> Self {
        Self { transport, poll }
    }

    /// Run a query to completion.
    ///
    /// Settles exactly once: with the result, the backend's failure, a
    /// submission error, or [`QueryDeskError::QueryTimeout`].
    pub async fn execute(
        &self,
        text: &str,
        session_id: &str,
        on_progress: Option<ProgressCallback>,
    ) -> QueryDeskResult<QueryResult> {
        self.execute_with_token(text, session_id, on_progress, CancellationToken::new()).await
    }

    /// Start a query in the background and return a cancellable handle.
    pub fn start(
        &self,
        text: impl Into<String>,
        session_id: impl Into<String>,
        on_progress: Option<ProgressCallback>,
    ) -> QueryHandle {
        let text = text.into();
        let session_id = session_id.into();
        let cancel_token = CancellationToken::new();

        let orchestrator = self.clone();
        let token = cancel_token.clone();
        let query_text = text.clone();
        let task = tokio::spawn(async move {
            orchestrator.execute_with_token(&query_text, &session_id, on_progress, token).await
        });

        QueryHandle { text, started_at: Utc::now(), cancel_token, task }
    }

    /// Run a query, stopping early once `token` is cancelled.
    ///
    /// A cancelled call resolves to [`QueryDeskError::QueryCancelled`] and
    /// produces no other side effects after the cancellation.
    pub async fn execute_with_token(
        &self,
        text: &str,
        session_id: &str,
        on_progress: Option<ProgressCallback>,
        token: CancellationToken,
    ) -> QueryDeskResult<QueryResult> {
        let started = Instant::now();
        let deadline = sleep_until(started + self.poll.query_timeout);
        tokio::pin!(deadline);

        tracing::debug!(session_id, "Submitting query");

        let accepted = select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(session_id, "Query cancelled before submission completed");
                return Err(QueryDeskError::query_cancelled(None));
            }
            _ = &mut deadline => {
                tracing::warn!(session_id, "Query timed out during submission");
                return Err(QueryDeskError::query_timeout(None, started.elapsed()));
            }
            accepted = self.transport.submit_query(text, session_id) => {
                accepted.map_err(|e| match e {
                    e @ QueryDeskError::Submission { .. } => e,
                    other => QueryDeskError::submission(other.to_string()),
                })?
            }
        };

        let mut poll = PollState::new(QuerySubmission::new(accepted.query_id, text, session_id));
        tracing::debug!(query_id = poll.query_id(), "Query accepted");

        loop {
            let response = select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(query_id = poll.query_id(), attempt = poll.attempt, "Query cancelled");
                    return Err(QueryDeskError::query_cancelled(Some(poll.submission.query_id)));
                }
                _ = &mut deadline => return Err(Self::timed_out(poll, started)),
                response = self.transport.query_status(poll.query_id()) => response,
            };

            poll.attempt += 1;
            let response = response.inspect_err(|e| {
                tracing::warn!(query_id = poll.query_id(), attempt = poll.attempt, error = %e, "Status poll failed");
            })?;

            // A cancel that raced the response still wins
            if token.is_cancelled() {
                return Err(QueryDeskError::query_cancelled(Some(poll.submission.query_id)));
            }

            let (status, stats) = response.into_parts();
            tracing::trace!(query_id = poll.query_id(), attempt = poll.attempt, status = status.label(), "Polled query status");

            if let (Some(stats), Some(on_progress)) = (stats, on_progress.as_ref()) {
                on_progress(&stats);
            }

            match status {
                QueryStatus::Completed(result) => {
                    tracing::debug!(
                        query_id = poll.query_id(),
                        attempts = poll.attempt,
                        row_count = result.row_count(),
                        "Query completed"
                    );
                    return Ok(result);
                }
                QueryStatus::Failed(message) => {
                    let message = message.as_deref().unwrap_or(QUERY_FAILED_FALLBACK);
                    tracing::warn!(query_id = poll.query_id(), message, "Query failed");
                    return Err(QueryDeskError::query_failed(poll.query_id(), message));
                }
                QueryStatus::TimedOut => return Err(Self::timed_out(poll, started)),
                pending => poll.status = pending,
            }

            let delay = self.poll.interval_for(poll.attempt);
            select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(query_id = poll.query_id(), attempt = poll.attempt, "Query cancelled");
                    return Err(QueryDeskError::query_cancelled(Some(poll.submission.query_id)));
                }
                _ = &mut deadline => return Err(Self::timed_out(poll, started)),
                _ = sleep(delay) => {}
            }
        }
    }

    fn timed_out(mut poll: PollState, started: Instant) -> QueryDeskError {
        poll.status = QueryStatus::TimedOut;
        let elapsed = started.elapsed();
        tracing::warn!(
            query_id = poll.query_id(),
            attempts = poll.attempt,
            elapsed_secs = elapsed.as_secs(),
            status = poll.status.label(),
            "Query timed out"
        );
        QueryDeskError::query_timeout(Some(poll.submission.query_id), elapsed)
    }
}
