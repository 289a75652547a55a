//! Data models for QueryDesk.
//!
//! This module contains all core data structures:
//! - `connection` - ConnectionRequest, ConnectionInfo, ConnectionStatus
//! - `schema` - TableSchema, ColumnSchema
//! - `query` - QuerySubmission, QueryStatus, QueryResult, Stats
//! - `context` - ContextStatus, ContextLoadResult
//! - `chat` - ChatMessage, MessageIdGenerator
//! - `history` - HistoryEntry

pub mod chat;
pub mod connection;
pub mod context;
pub mod history;
pub mod query;
pub mod schema;

pub use chat::{ChatMessage, MessageContent, MessageIdGenerator, MessageKind};
pub use connection::{ConnectionInfo, ConnectionRequest, ConnectionStatus, DbType};
pub use context::{ContextLoadResult, ContextStatus, SampleResult};
pub use history::HistoryEntry;
pub use query::{
    QueryAccepted, QueryResult, QueryStatus, QueryStatusResponse, QuerySubmission, Row, Stats,
    SystemHealth,
};
pub use schema::{ColumnSchema, SchemaResponse, TableSchema};
