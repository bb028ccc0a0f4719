//! Mock database clients for testing.
//!
//! Provides in-memory clients with canned results, used by unit tests and
//! headless runs that don't need a real server.

use super::{ColumnInfo, DatabaseClient, QueryResult, Value};
use crate::error::{Result, TrackerError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Statements and parameters a mock client has seen.
pub type QueryLog = Arc<Mutex<Vec<(String, Vec<Value>)>>>;

/// A mock database client that returns predefined results.
///
/// Results are matched by SQL substring, first match wins. Unmatched queries
/// get a one-column `result` table.
#[derive(Debug, Clone, Default)]
pub struct MockDatabaseClient {
    responses: Vec<(String, QueryResult)>,
    closes: Arc<AtomicUsize>,
    log: QueryLog,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with no canned results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `result` for every query containing `fragment`.
    pub fn with_response(mut self, fragment: impl Into<String>, result: QueryResult) -> Self {
        self.responses.push((fragment.into(), result));
        self
    }

    /// Shared counter incremented on every `close` call.
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    /// Shared log of executed statements.
    pub fn query_log(&self) -> QueryLog {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        if let Ok(mut log) = self.log.lock() {
            log.push((sql.to_string(), params.to_vec()));
        }

        let canned = self
            .responses
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, result)| result.clone());

        Ok(canned.unwrap_or_else(|| {
            QueryResult::with_data(
                vec![ColumnInfo::new("result", "TEXT")],
                vec![vec![Value::String(format!("Mock result for: {sql}"))]],
            )
            .with_execution_time(Duration::from_millis(1))
        }))
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A client whose queries always fail, for exercising error paths.
#[derive(Debug, Clone, Default)]
pub struct FailingDatabaseClient {
    message: String,
    closes: Arc<AtomicUsize>,
}

impl FailingDatabaseClient {
    /// Creates a client that fails every query with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter incremented on every `close` call.
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str, _params: &[Value]) -> Result<QueryResult> {
        Err(TrackerError::query(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
