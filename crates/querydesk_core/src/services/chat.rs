//! Question submission and transcript updates.
//!
//! [`ChatSession`] is the only place that turns query outcomes into chat
//! actions. It allows one outstanding query at a time, which keeps
//! `chat.loading` true exactly while a poll lifecycle is running.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use super::query::{ProgressCallback, QueryOrchestrator};
use crate::error::{QueryDeskError, QueryDeskResult};
use crate::models::{ChatMessage, HistoryEntry, MessageIdGenerator, QueryResult};
use crate::state::{Action, Store};

struct ActiveQuery {
    generation: u64,
    token: CancellationToken,
}

/// Releases the active slot when a `submit` future is dropped mid-flight.
struct ActiveGuard<'a> {
    session: &'a ChatSession,
    generation: u64,
    token: CancellationToken,
    armed: bool,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.token.cancel();
        if self.session.settle(self.generation) {
            tracing::debug!(generation = self.generation, "Query abandoned before settling");
            self.session.store.dispatch(Action::SetChatLoading(false));
        }
    }
}

/// Chat front of the orchestrator.
pub struct ChatSession {
    store: Store,
    orchestrator: QueryOrchestrator,
    ids: MessageIdGenerator,
    active: Mutex<Option<ActiveQuery>>,
    generations: AtomicU64,
    progress: RwLock<Option<ProgressCallback>>,
}

impl ChatSession {
    /// Create a chat session.
    pub fn new(store: Store, orchestrator: QueryOrchestrator) -> Self {
        Self {
            store,
            orchestrator,
            ids: MessageIdGenerator::new(),
            active: Mutex::new(None),
            generations: AtomicU64::new(1),
            progress: RwLock::new(None),
        }
    }

    /// Forward queue statistics from every poll to `callback`.
    pub fn set_progress_callback(&self, callback: ProgressCallback) {
        *self.progress.write() = Some(callback);
    }

    /// Whether a query is outstanding.
    pub fn is_busy(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Ask a question.
    ///
    /// Blank input, a missing session, or an outstanding query is refused
    /// with [`QueryDeskError::Submission`] before anything is dispatched.
    /// Otherwise the outcome is recorded in the transcript and also returned.
    pub async fn submit(&self, text: &str) -> QueryDeskResult<QueryResult> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QueryDeskError::submission("Query text is empty"));
        }

        let state = self.store.get_state();
        let session_id = match state.session_id() {
            Some(id) if state.is_connected() => id.to_string(),
            _ => return Err(QueryDeskError::submission("Not connected to a database")),
        };

        let (generation, token) = {
            let mut active = self.active.lock();
            if active.is_some() || state.chat.loading {
                tracing::warn!(session_id = %session_id, "Rejected overlapping query submission");
                return Err(QueryDeskError::submission("A query is already running"));
            }
            let generation = self.generations.fetch_add(1, Ordering::Relaxed);
            let token = CancellationToken::new();
            *active = Some(ActiveQuery { generation, token: token.clone() });
            (generation, token)
        };
        let mut guard = ActiveGuard { session: self, generation, token: token.clone(), armed: true };

        self.store.dispatch(Action::AddMessage(ChatMessage::user(self.ids.next_id(), text)));
        self.store.dispatch(Action::SetChatLoading(true));
        self.store.dispatch(Action::AddToHistory(HistoryEntry::new(text)));

        // A cancel that landed during the dispatches above cleared loading
        // before it was set; clear it again.
        if token.is_cancelled() {
            guard.armed = false;
            self.store.dispatch(Action::SetChatLoading(false));
            return Err(QueryDeskError::query_cancelled(None));
        }

        let progress = self.progress.read().clone();
        let outcome =
            self.orchestrator.execute_with_token(text, &session_id, progress, token).await;

        guard.armed = false;
        if !self.settle(generation) {
            // Cancelled through `cancel`, which already cleared the loading flag
            return outcome;
        }

        match &outcome {
            Ok(result) => {
                self.store.dispatch(Action::AddMessage(ChatMessage::assistant(
                    self.ids.next_id(),
                    result.clone(),
                )));
                self.store.dispatch(Action::SetChatLoading(false));
            }
            Err(e) if e.is_cancelled() => {
                self.store.dispatch(Action::SetChatLoading(false));
            }
            Err(e) => {
                let message = e.to_string();
                self.store.dispatch(Action::SetChatError(message.clone()));
                self.store.dispatch(Action::AddMessage(ChatMessage::error(
                    self.ids.next_id(),
                    message,
                )));
            }
        }

        outcome
    }

    /// Ask a previously submitted question again.
    pub async fn rerun(&self, entry: &HistoryEntry) -> QueryDeskResult<QueryResult> {
        self.submit(&entry.query).await
    }

    /// Cancel the outstanding query, if any.
    ///
    /// The query settles silently; only `chat.loading` is cleared.
    pub fn cancel(&self) -> bool {
        let Some(active) = self.active.lock().take() else {
            return false;
        };
        active.token.cancel();
        tracing::debug!(generation = active.generation, "Cancelled outstanding query");
        self.store.dispatch(Action::SetChatLoading(false));
        true
    }

    /// Cancel any outstanding query and empty the transcript.
    pub fn clear(&self) {
        self.cancel();
        self.store.dispatch(Action::ClearChat);
    }

    /// Release the active slot if it still belongs to `generation`.
    fn settle(&self, generation: u64) -> bool {
        let mut active = self.active.lock();
        match active.as_ref() {
            Some(current) if current.generation == generation => {
                *active = None;
                true
            }
            _ => false,
        }
    }
}
