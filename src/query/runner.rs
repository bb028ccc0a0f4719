//! Connection factory and query runner.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::ConnectionConfig;
use crate::db::{
    self, DatabaseBackend, DatabaseClient, FailingDatabaseClient, MockDatabaseClient, QueryResult,
    Value,
};
use crate::error::Result;
use crate::safety::ensure_read_only;

/// Opens a fresh database connection on demand.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn DatabaseClient>>;

    /// SQL dialect of the connections this factory opens.
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::MySql
    }
}

#[async_trait]
impl ConnectionFactory for ConnectionConfig {
    async fn open(&self) -> Result<Box<dyn DatabaseClient>> {
        db::connect(self).await
    }

    fn backend(&self) -> DatabaseBackend {
        self.backend
    }
}

// Mock clients hand out clones that share their counters and logs.
#[async_trait]
impl ConnectionFactory for MockDatabaseClient {
    async fn open(&self) -> Result<Box<dyn DatabaseClient>> {
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl ConnectionFactory for FailingDatabaseClient {
    async fn open(&self) -> Result<Box<dyn DatabaseClient>> {
        Ok(Box::new(self.clone()))
    }
}

/// Runs read-only statements, one connection per statement.
#[derive(Clone)]
pub struct QueryRunner {
    factory: Arc<dyn ConnectionFactory>,
}

impl QueryRunner {
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        Self { factory }
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.factory.backend()
    }

    /// Executes `sql` with positional `params`.
    ///
    /// The statement is checked with [`ensure_read_only`] before a connection
    /// is opened. Once opened, the connection is closed on every path; a
    /// failed close is logged and does not mask the query outcome.
    pub async fn run(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        ensure_read_only(sql)?;

        let start = Instant::now();
        let client = self.factory.open().await?;
        let result = client.execute_query(sql, params).await;

        if let Err(e) = client.close().await {
            warn!("Failed to close connection: {}", e);
        }

        match &result {
            Ok(r) => debug!(
                rows = r.row_count,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Query finished"
            ),
            Err(e) => warn!("Query failed: {}", e),
        }

        result
    }
}
