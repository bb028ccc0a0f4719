//! SQLite database client implementation.
//!
//! Used for local snapshots of the asteroid tables and for test fixtures.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value, MAX_ROWS};
use crate::error::{Result, TrackerError};
use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{
    Column as SqlxColumn, ConnectOptions, Connection, Executor, Row as SqlxRow, Statement,
    TypeInfo, ValueRef,
};
use std::path::Path;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// SQLite database client holding exactly one connection.
#[derive(Debug)]
pub struct SqliteClient {
    conn: Mutex<Option<SqliteConnection>>,
}

impl SqliteClient {
    /// Opens an existing SQLite database file.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let path = config
            .path
            .as_deref()
            .ok_or_else(|| TrackerError::config("SQLite backend requires 'path'"))?;

        debug!("Opening SQLite database {}", path.display());
        let conn = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .read_only(true)
            .connect()
            .await
            .map_err(|e| {
                TrackerError::connection(format!(
                    "Cannot open SQLite database {}: {e}",
                    path.display()
                ))
            })?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn execute_query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let mut guard = self.conn.lock().await;
        let conn = guard
            .as_mut()
            .ok_or_else(|| TrackerError::connection("Connection already closed"))?;

        let start = Instant::now();

        let query = params
            .iter()
            .fold(sqlx::query(sql), |query, value| bind_value(query, value));

        let result: Vec<SqliteRow> = query
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| TrackerError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let columns: Vec<ColumnInfo> = match result.first() {
            Some(first_row) => first_row
                .columns()
                .iter()
                .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                .collect(),
            None => match (&mut *conn).prepare(sql).await {
                Ok(statement) => statement
                    .columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect(),
                Err(e) => {
                    debug!("Could not describe empty result: {}", e);
                    Vec::new()
                }
            },
        };

        let total_rows = result.len();
        let was_truncated = total_rows > MAX_ROWS;

        if was_truncated {
            warn!(
                "Query returned {} rows, truncating to {} rows",
                total_rows, MAX_ROWS
            );
        }

        let rows: Vec<Row> = result.iter().take(MAX_ROWS).map(convert_row).collect();
        let row_count = rows.len();

        Ok(QueryResult {
            columns,
            rows,
            execution_time,
            row_count,
            total_rows: Some(total_rows),
            was_truncated,
        })
    }

    async fn close(&self) -> Result<()> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            conn.close()
                .await
                .map_err(|e| TrackerError::connection(format!("Failed to close connection: {e}")))?;
        }
        Ok(())
    }
}

/// Creates (if needed) the SQLite file at `path` and runs the given SQL script in it.
///
/// The script may hold several `;`-separated statements.
pub async fn seed_sqlite(path: &Path, script: &str) -> Result<()> {
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .connect()
        .await
        .map_err(|e| {
            TrackerError::connection(format!(
                "Cannot create SQLite database {}: {e}",
                path.display()
            ))
        })?;

    sqlx::raw_sql(script)
        .execute(&mut conn)
        .await
        .map_err(|e| TrackerError::query(format!("Seed script failed: {}", format_query_error(e))))?;

    conn.close()
        .await
        .map_err(|e| TrackerError::connection(format!("Failed to close connection: {e}")))?;

    info!("Seeded SQLite database {}", path.display());
    Ok(())
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::String(s) => query.bind(s.as_str()),
        // SQLite has no date type; dates are stored and compared as ISO text
        Value::Date(_) | Value::DateTime(_) => query.bind(value.to_display_string()),
        Value::Bytes(b) => query.bind(b.as_slice()),
    }
}

fn convert_row(row: &SqliteRow) -> Row {
    (0..row.columns().len())
        .map(|i| convert_value(row, i))
        .collect()
}

/// Converts a column by its storage class rather than its declared type.
///
/// SQLite columns are dynamically typed, so the declared type is only a hint.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let storage = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    let decoded = match storage.as_str() {
        "INTEGER" => row.try_get_unchecked::<i64, _>(index).map(Value::Int),
        "REAL" => row.try_get_unchecked::<f64, _>(index).map(Value::Float),
        "BLOB" => row.try_get_unchecked::<Vec<u8>, _>(index).map(Value::Bytes),
        _ => row.try_get_unchecked::<String, _>(index).map(Value::String),
    };

    decoded.unwrap_or(Value::Null)
}

fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => format!("ERROR: {}", db_error.message()),
        None => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SEED: &str = "
        CREATE TABLE asteroids (id INTEGER PRIMARY KEY, name TEXT, absolute_magnitude_h REAL);
        INSERT INTO asteroids VALUES (1, '433 Eros', 10.4);
        INSERT INTO asteroids VALUES (2, '(2024 AB)', 24.9);
    ";

    async fn seeded_client() -> (TempDir, SqliteClient) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("neo.db");
        seed_sqlite(&path, SEED).await.unwrap();
        let client = SqliteClient::connect(&ConnectionConfig::sqlite(&path))
            .await
            .unwrap();
        (dir, client)
    }

    #[tokio::test]
    async fn test_query_with_params() {
        let (_dir, client) = seeded_client().await;

        let result = client
            .execute_query(
                "SELECT name, absolute_magnitude_h FROM asteroids WHERE absolute_magnitude_h < ?",
                &[Value::Float(20.0)],
            )
            .await
            .unwrap();

        assert_eq!(result.row_count, 1);
        assert_eq!(result.rows[0][0], Value::String("433 Eros".to_string()));
        assert_eq!(result.rows[0][1], Value::Float(10.4));
    }

    #[tokio::test]
    async fn test_empty_result_keeps_columns() {
        let (_dir, client) = seeded_client().await;

        let result = client
            .execute_query("SELECT id, name FROM asteroids WHERE id = ?", &[Value::Int(99)])
            .await
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(result.column_names(), vec!["id", "name"]);
    }

    #[tokio::test]
    async fn test_aggregate_is_integer() {
        let (_dir, client) = seeded_client().await;

        let result = client
            .execute_query("SELECT COUNT(*) AS count FROM asteroids", &[])
            .await
            .unwrap();

        assert_eq!(result.rows[0][0], Value::Int(2));
    }

    #[tokio::test]
    async fn test_bad_sql_is_query_error() {
        let (_dir, client) = seeded_client().await;

        let err = client
            .execute_query("SELECT * FROM comets", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::Query(_)));
        assert!(err.message().contains("no such table"));
    }

    #[tokio::test]
    async fn test_query_after_close_fails() {
        let (_dir, client) = seeded_client().await;

        client.close().await.unwrap();
        // Closing twice is harmless
        client.close().await.unwrap();

        let err = client.execute_query("SELECT 1", &[]).await.unwrap_err();
        assert!(matches!(err, TrackerError::Connection(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_connection_error() {
        let dir = TempDir::new().unwrap();
        let config = ConnectionConfig::sqlite(dir.path().join("absent.db"));

        let err = SqliteClient::connect(&config).await.unwrap_err();
        assert!(matches!(err, TrackerError::Connection(_)));
    }
}
