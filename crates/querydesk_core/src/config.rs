//! Client configuration.
//!
//! Defaults reproduce the backend contract: 1s polls for the first five
//! attempts, 3s up to attempt fifteen, 5s afterwards, and a hard 300s ceiling
//! per query.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{QueryDeskError, QueryDeskResult};

/// Default backend address.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default per-request HTTP timeout.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Overall deadline for one query, measured from submission.
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 300;

/// Environment variable overriding the backend address.
pub const API_URL_ENV: &str = "QUERYDESK_API_URL";

/// Environment variable overriding the per-request timeout (seconds).
pub const REQUEST_TIMEOUT_ENV: &str = "QUERYDESK_REQUEST_TIMEOUT_SECS";

/// Polling schedule for one query lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Interval used after attempts `1..=fast_attempts`.
    pub fast_interval: Duration,
    /// Last attempt that uses the fast interval.
    pub fast_attempts: u32,
    /// Interval used after attempts `fast_attempts+1..=medium_attempts`.
    pub medium_interval: Duration,
    /// Last attempt that uses the medium interval.
    pub medium_attempts: u32,
    /// Interval used for every later attempt.
    pub slow_interval: Duration,
    /// Overall deadline for one query.
    pub query_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            fast_interval: Duration::from_secs(1),
            fast_attempts: 5,
            medium_interval: Duration::from_secs(3),
            medium_attempts: 15,
            slow_interval: Duration::from_secs(5),
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
        }
    }
}

impl PollConfig {
    /// Delay to wait after poll `attempt` (1-based) before issuing the next one.
    pub fn interval_for(&self, attempt: u32) -> Duration {
        if attempt <= self.fast_attempts {
            self.fast_interval
        } else if attempt <= self.medium_attempts {
            self.medium_interval
        } else {
            self.slow_interval
        }
    }

    /// Override the overall deadline.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }
}

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every API path is resolved against.
    pub api_base_url: String,
    /// Timeout for a single HTTP request.
    pub request_timeout: Duration,
    /// Query polling schedule.
    pub poll: PollConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            poll: PollConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given backend address.
    pub fn new(api_base_url: impl Into<String>) -> QueryDeskResult<Self> {
        Self::default().with_api_base_url(api_base_url)
    }

    /// Build a configuration from `QUERYDESK_*` environment variables.
    pub fn from_env() -> QueryDeskResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> QueryDeskResult<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_ENV) {
            config = config.with_api_base_url(url)?;
        }

        if let Some(raw) = lookup(REQUEST_TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                QueryDeskError::config(format!("{REQUEST_TIMEOUT_ENV} must be a number of seconds, got '{raw}'"))
            })?;
            config = config.with_request_timeout(Duration::from_secs(secs))?;
        }

        Ok(config)
    }

    /// Set the backend address. Trailing slashes are dropped.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> QueryDeskResult<Self> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(QueryDeskError::config(format!(
                "API URL must start with http:// or https://, got '{url}'"
            )));
        }
        self.api_base_url = trimmed.to_string();
        Ok(self)
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> QueryDeskResult<Self> {
        if timeout.is_zero() {
            return Err(QueryDeskError::config("Request timeout must be greater than zero"));
        }
        self.request_timeout = timeout;
        Ok(self)
    }

    /// Set the polling schedule.
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Resolve an API path against the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

/// Get the default data directory for the client.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(std::env::temp_dir).join("querydesk")
}
