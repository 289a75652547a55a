//! Core of the QueryDesk natural-language database client.
//!
//! This crate provides the client side of QueryDesk:
//!
//! - **error**: Error taxonomy shared by every operation
//! - **config**: Backend address, timeouts and the polling schedule
//! - **models**: Wire and domain types (queries, schema, chat, history)
//! - **services**: Transport, query orchestration, connection/schema/context flows
//! - **state**: Single-writer application state store
//! - **logging**: Structured logging setup

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;

pub use client::QueryDeskClient;
pub use config::{ClientConfig, PollConfig};
pub use error::{QueryDeskError, QueryDeskResult};
pub use models::{
    ChatMessage, ColumnSchema, ConnectionInfo, ConnectionRequest, ContextLoadResult,
    ContextStatus, DbType, HistoryEntry, MessageContent, MessageKind, QueryResult, QueryStatus,
    Row, Stats, SystemHealth, TableSchema,
};
pub use services::{
    ChatSession, ConnectionService, ContextStatusMonitor, HttpTransport, ProgressCallback,
    QueryHandle, QueryOrchestrator, SchemaService, StatsService, Transport,
};
pub use state::{Action, ApplicationState, Store};
