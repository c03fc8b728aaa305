//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Row not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Optimistic concurrency conflict: the aggregate changed between read
    /// and write.
    #[error("version conflict on recipe {recipe_id}: expected {expected}, found {actual}")]
    Conflict {
        recipe_id: i64,
        expected: i64,
        actual: i64,
    },

    /// The email is already registered.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// A search query exceeded its deadline.
    #[error("search timed out")]
    Timeout,

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
