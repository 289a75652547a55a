//! Backend services for QueryDesk.
//!
//! This module contains all service layer abstractions:
//! - `transport` - The backend HTTP API as a trait
//! - `http` - reqwest implementation of the transport
//! - `query` - Query orchestration with backoff, deadline and cancellation
//! - `chat` - Question submission and transcript updates
//! - `connection` - Session connect/disconnect
//! - `schema` - Schema loading and refresh
//! - `context` - Model context status and loading
//! - `stats` - Backend queue statistics

pub mod chat;
pub mod connection;
pub mod context;
pub mod http;
pub mod query;
pub mod schema;
pub mod stats;
pub mod transport;

pub use chat::ChatSession;
pub use connection::ConnectionService;
pub use context::ContextStatusMonitor;
pub use http::HttpTransport;
pub use query::{ProgressCallback, QueryHandle, QueryOrchestrator};
pub use schema::SchemaService;
pub use stats::StatsService;
pub use transport::Transport;
