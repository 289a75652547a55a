//! Connection request and session models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Database engine the backend should connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// PostgreSQL (default)
    #[default]
    Postgresql,
    /// MySQL / MariaDB
    Mysql,
}

impl DbType {
    /// Convert to wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
        }
    }

    /// Parse from user input. Unknown names fall back to PostgreSQL.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Self::Mysql,
            _ => Self::Postgresql,
        }
    }

    /// Conventional port for this engine.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Postgresql => 5432,
            Self::Mysql => 3306,
        }
    }
}

/// Credentials-based connection request (`POST /api/connect-db`).
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionRequest {
    /// Connection kind; always `"credentials"` for this request.
    #[serde(rename = "type")]
    pub kind: String,
    /// Database host
    pub host: String,
    /// Database port
    pub port: u16,
    /// Username
    pub username: String,
    /// Password (never logged)
    pub password: String,
    /// Database name
    pub database: String,
    /// Database engine
    pub db_type: DbType,
}

impl ConnectionRequest {
    /// Create a credentials request using the engine's default port.
    pub fn new(
        db_type: DbType,
        host: impl Into<String>,
        username: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            kind: "credentials".to_string(),
            host: host.into(),
            port: db_type.default_port(),
            username: username.into(),
            password: String::new(),
            database: database.into(),
            db_type,
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }
}

impl std::fmt::Debug for ConnectionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRequest")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("db_type", &self.db_type)
            .finish()
    }
}

/// Backend response to a successful connection.
///
/// Only `session_id` is interpreted; anything else the backend sends is kept
/// verbatim for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Backend-assigned session identifier
    pub session_id: String,
    /// Remaining response fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConnectionInfo {
    /// Create connection info with only a session id.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), extra: Map::new() }
    }

    /// Backend-provided message, if any.
    pub fn message(&self) -> Option<&str> {
        self.extra.get("message").and_then(Value::as_str)
    }
}

/// Response of `GET /api/connection/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Whether the backend still holds a live connection for the session
    #[serde(default)]
    pub connected: bool,
    /// Remaining response fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
