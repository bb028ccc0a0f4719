//! MySQL/TiDB database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient` trait
//! over a single sqlx connection (no pool) to a MySQL-compatible server.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value, MAX_ROWS};
use crate::error::{Result, TrackerError};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::mysql::{
    MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlDatabaseError, MySqlRow,
    MySqlSslMode,
};
use sqlx::query::Query;
use sqlx::{Column as SqlxColumn, ConnectOptions, Connection, Executor, Row as SqlxRow, Statement, TypeInfo};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// MySQL-compatible database client holding exactly one connection.
#[derive(Debug)]
pub struct MySqlClient {
    conn: Mutex<Option<MySqlConnection>>,
}

impl MySqlClient {
    /// Opens a new connection using the given configuration.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = connect_options(config)?;

        debug!("Opening MySQL connection to {}", config.display_string());
        let conn = options
            .connect()
            .await
            .map_err(|e| map_connection_error(e, config))?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn execute_query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let mut guard = self.conn.lock().await;
        let conn = guard
            .as_mut()
            .ok_or_else(|| TrackerError::connection("Connection already closed"))?;

        let start = Instant::now();

        let query = params
            .iter()
            .fold(sqlx::query(sql), |query, value| bind_value(query, value));

        let result: Vec<MySqlRow> = query
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
            // Empty result: the prepared statement still knows its columns
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

/// Builds sqlx connect options from the config fields.
///
/// Options are built field by field so credentials never pass through URL encoding.
fn connect_options(config: &ConnectionConfig) -> Result<MySqlConnectOptions> {
    config.validate()?;

    let host = config.host.as_deref().unwrap_or("localhost");
    let mut options = MySqlConnectOptions::new().host(host).port(config.port());

    if let Some(user) = &config.user {
        options = options.username(user);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    if let Some(name) = &config.name {
        options = options.database(name);
    }
    if let Some(mode) = &config.ssl_mode {
        let mode: MySqlSslMode = mode
            .parse()
            .map_err(|e| TrackerError::config(format!("Invalid ssl_mode '{mode}': {e}")))?;
        options = options.ssl_mode(mode);
    }

    Ok(options)
}

/// Binds one positional parameter.
fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &'q Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::String(s) => query.bind(s.as_str()),
        Value::Date(d) => query.bind(*d),
        Value::DateTime(dt) => query.bind(*dt),
        Value::Bytes(b) => query.bind(b.as_slice()),
    }
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
///
/// Falls back to text decoding when the typed decode is rejected.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let type_name = type_name.to_uppercase();

    let decoded: std::result::Result<Option<Value>, sqlx::Error> = match type_name.as_str() {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .map(|v| v.map(Value::Bool)),

        "TINYINT" | "SMALLINT" | "INT" | "MEDIUMINT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .map(|v| v.map(Value::Int)),

        t if t.ends_with("UNSIGNED") => row
            .try_get::<Option<u64>, _>(index)
            .map(|v| v.map(|u| Value::Int(i64::try_from(u).unwrap_or(i64::MAX)))),

        "FLOAT" => row
            .try_get::<Option<f32>, _>(index)
            .map(|v| v.map(|f| Value::Float(f as f64))),

        "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .map(|v| v.map(Value::Float)),

        "DECIMAL" => row
            .try_get::<Option<BigDecimal>, _>(index)
            .map(|v| v.map(decimal_to_value)),

        "DATE" => row
            .try_get::<Option<time::Date>, _>(index)
            .map(|v| v.map(Value::Date)),

        "DATETIME" | "TIMESTAMP" => row
            .try_get::<Option<time::PrimitiveDateTime>, _>(index)
            .map(|v| v.map(Value::DateTime)),

        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .map(|v| v.map(Value::Bytes)),

        _ => row
            .try_get::<Option<String>, _>(index)
            .map(|v| v.map(Value::String)),
    };

    match decoded {
        Ok(Some(value)) => value,
        Ok(None) => Value::Null,
        Err(_) => row
            .try_get_unchecked::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// DECIMAL aggregates (AVG, SUM) become floats so they chart.
fn decimal_to_value(decimal: BigDecimal) -> Value {
    let text = decimal.to_string();
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::Float(f),
        _ => Value::String(text),
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> TrackerError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port();
    let user = config.user.as_deref().unwrap_or("unknown");
    let name = config.name.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        TrackerError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("access denied") {
        TrackerError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("unknown database") {
        TrackerError::connection(format!("Database '{name}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") || error_str.contains("secure transport") {
        TrackerError::connection(
            "Server requires TLS. Set ssl_mode = \"required\" in the database settings.".to_string(),
        )
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        TrackerError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        TrackerError::connection(error.to_string())
    }
}

/// Formats a query error with the server error number and SQLSTATE when available.
fn format_query_error(error: sqlx::Error) -> String {
    if let Some(db_error) = error.as_database_error() {
        if let Some(mysql_error) = db_error.try_downcast_ref::<MySqlDatabaseError>() {
            return match mysql_error.code() {
                Some(state) => format!(
                    "ERROR {} ({}): {}",
                    mysql_error.number(),
                    state,
                    mysql_error.message()
                ),
                None => format!("ERROR {}: {}", mysql_error.number(), mysql_error.message()),
            };
        }
        return format!("ERROR: {}", db_error.message());
    }

    error.to_string()
}
