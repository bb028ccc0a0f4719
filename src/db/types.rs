//! Query result types for NEO Tracker.
//!
//! Defines the structures used to represent query results from the database.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

/// Represents the result of executing a SQL query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// Column metadata for the result set.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data.
    pub rows: Vec<Row>,

    /// Time taken to execute the query.
    #[serde(with = "duration_serde")]
    pub execution_time: Duration,

    /// Number of rows in the result (may be truncated).
    pub row_count: usize,

    /// Total number of rows before truncation (if known).
    pub total_rows: Option<usize>,

    /// Whether the result was truncated due to exceeding MAX_ROWS.
    #[serde(default)]
    pub was_truncated: bool,
}

impl QueryResult {
    /// Creates a new empty query result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            execution_time: Duration::ZERO,
            row_count,
            total_rows: Some(row_count),
            was_truncated: false,
        }
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the values of the column at `index`, one per row.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Returns a truncation warning message if the result was truncated.
    pub fn truncation_warning(&self) -> Option<String> {
        if self.was_truncated {
            let total = self.total_rows.unwrap_or(self.row_count);
            Some(format!(
                "⚠ Result truncated: showing {} of {} rows",
                self.row_count, total
            ))
        } else {
            None
        }
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Column data type as reported by the driver.
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Represents a single value from a database query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number (also used for DECIMAL columns).
    Float(f64),

    /// Text/string value.
    String(String),

    /// Calendar date.
    Date(Date),

    /// Date and time without offset.
    DateTime(PrimitiveDateTime),

    /// Binary data.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as a number, if it has a numeric reading.
    ///
    /// Strings are parsed so that drivers returning DECIMAL as text still chart.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if f.is_finite() => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Attempts to convert the value to a string representation.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Date(d) => d
                .format(format_description!("[year]-[month]-[day]"))
                .unwrap_or_else(|_| d.to_string()),
            Value::DateTime(dt) => dt
                .format(format_description!(
                    "[year]-[month]-[day] [hour]:[minute]:[second]"
                ))
                .unwrap_or_else(|_| dt.to_string()),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

// Conversion implementations for common types
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Date> for Value {
    fn from(v: Date) -> Self {
        Value::Date(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// Serde support for Duration (not natively supported by serde).
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_nanos().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u128::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos as u64))
    }
}
