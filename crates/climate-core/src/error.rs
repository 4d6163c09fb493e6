//! Centralized error types for the climate API.
//!
//! Errors carry full detail for logging; `DatabaseError::user_message()` gives
//! the short text returned in HTTP error bodies.

use thiserror::Error;

/// Database/storage errors (SQLite).
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),

    #[error("Schema mismatch in table {table}: {detail}")]
    SchemaMismatch { table: String, detail: String },

    #[error("Query exceeded {millis} ms")]
    Timeout { millis: u64 },
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => "The weather database is unavailable.",
            DatabaseError::QueryFailed(_) => "A database query failed.",
            DatabaseError::Corruption(_) => "The weather database appears to be corrupted.",
            DatabaseError::SchemaMismatch { .. } => {
                "The weather database does not have the expected layout."
            }
            DatabaseError::Timeout { .. } => "The database query took too long.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_database_error(self) -> DatabaseError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_database_error(self) -> DatabaseError {
        match &self {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                DatabaseError::Corruption(self.to_string())
            }
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::CannotOpen =>
            {
                DatabaseError::ConnectionFailed(self.to_string())
            }
            _ => DatabaseError::QueryFailed(self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_user_message() {
        let err = DatabaseError::Timeout { millis: 10 };
        assert_eq!(err.user_message(), "The database query took too long.");
    }

    #[test]
    fn test_user_message_hides_detail() {
        let err = DatabaseError::QueryFailed("no such column: tobs".into());
        assert!(!err.user_message().contains("tobs"));
    }

    #[test]
    fn test_rusqlite_conversion() {
        let err = rusqlite::Error::QueryReturnedNoRows.into_database_error();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }
}
