//! Model context status and loading.
//!
//! Missing context is a normal condition, so neither operation here returns
//! an error: failures come back as "not loaded" / "not successful" values.

use std::sync::Arc;

use super::transport::Transport;
use crate::models::{ContextLoadResult, ContextStatus};

/// Reports and loads backend-side model context for a session.
#[derive(Clone)]
pub struct ContextStatusMonitor {
    transport: Arc<dyn Transport>,
}

impl ContextStatusMonitor {
    /// Create a monitor.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Ask whether context is loaded. One request, no retry; a failed
    /// request reads as `loaded: false`.
    pub async fn check_status(&self, session_id: &str) -> ContextStatus {
        match self.transport.context_status(session_id).await {
            Ok(status) => {
                tracing::debug!(session_id, loaded = status.loaded, "Context status checked");
                status
            }
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Failed to check context status");
                ContextStatus::not_loaded(e.to_string())
            }
        }
    }

    /// Load context for the session.
    pub async fn load(&self, session_id: &str) -> ContextLoadResult {
        match self.transport.load_context(session_id).await {
            Ok(result) => {
                tracing::info!(
                    session_id,
                    success = result.success,
                    tables_count = result.tables_count,
                    "Context load finished"
                );
                result
            }
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Failed to load context");
                ContextLoadResult::failed(e.to_string())
            }
        }
    }
}
