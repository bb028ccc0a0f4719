//! Error types for NEO Tracker.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for NEO Tracker operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, schema mismatch, rejected statements, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, missing credentials, bad CLI values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (terminal failures, unexpected states, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection(msg) | Self::Query(msg) | Self::Config(msg) | Self::Internal(msg) => {
                msg
            }
        }
    }
}

/// Result type alias using TrackerError.
pub type Result<T> = std::result::Result<T, TrackerError>;
