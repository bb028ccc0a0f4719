//! Database abstraction layer for NEO Tracker.
//!
//! Provides a trait-based interface for database operations, allowing
//! different database backends to be used interchangeably.

mod mock;
mod mysql;
mod sqlite;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient, QueryLog};
pub use mysql::MySqlClient;
pub use sqlite::{seed_sqlite, SqliteClient};
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Maximum rows to keep from a single query.
pub const MAX_ROWS: usize = 1000;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// MySQL wire protocol (MySQL, MariaDB, TiDB).
    #[default]
    #[serde(alias = "tidb", alias = "mariadb")]
    MySql,
    /// Local SQLite database file.
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" | "tidb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

/// Opens a database client for the given configuration.
///
/// This is the central factory function for database connections. Every call
/// opens a brand-new connection; nothing is pooled or cached.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    match config.backend {
        DatabaseBackend::MySql => {
            let client = MySqlClient::connect(config).await?;
            Ok(Box::new(client))
        }
        DatabaseBackend::Sqlite => {
            let client = SqliteClient::connect(config).await?;
            Ok(Box::new(client))
        }
    }
}

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with TrackerError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a SQL query with positional `?` parameters and returns the results.
    async fn execute_query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Closes the database connection. Further queries fail.
    async fn close(&self) -> Result<()>;
}
