//! Backend queue statistics.

use std::sync::Arc;

use super::transport::Transport;
use crate::models::Stats;

/// Fetches system-wide stats snapshots.
///
/// Every fetch site degrades the same way: an unreachable backend reads as an
/// all-zero snapshot.
#[derive(Clone)]
pub struct StatsService {
    transport: Arc<dyn Transport>,
}

impl StatsService {
    /// Create a stats service.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Current snapshot, or zeros if the backend could not be reached.
    pub async fn fetch(&self) -> Stats {
        match self.transport.system_stats().await {
            Ok(stats) => {
                tracing::trace!(queued = stats.queued, processing = stats.processing, "System stats fetched");
                stats
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch system stats");
                Stats::default()
            }
        }
    }
}
