//! Table manager error types.

use thiserror::Error;

/// Errors raised by the store, the table handle and persistence.
///
/// Validation failures are not errors: they are reported through
/// [`TableHandle::row_errors`](crate::table::TableHandle::row_errors).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    /// Table name contains characters outside `[0-9A-Za-z_]`
    #[error("'{0}' isn't a valid name for custom table")]
    InvalidTableName(String),

    /// Table not found
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    /// Table already exists
    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    /// Column not found in table
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// Column declared twice in the same table
    #[error("Column '{column}' declared more than once in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// Null written to a NOT NULL column
    #[error("NOT NULL constraint failed: {table}.{column}")]
    NotNullViolation { table: String, column: String },

    /// Primary key value already taken
    #[error("UNIQUE constraint failed: {table}.{column}")]
    UniqueViolation { table: String, column: String },

    /// Input value has no row representation (arrays, objects)
    #[error("Unsupported value for column '{column}': {value}")]
    UnsupportedValue { column: String, value: String },

    /// Lock poisoned (RwLock poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Data corruption detected
    #[error("Data corruption detected: {0}")]
    DataCorruption(String),

    /// Disk full error during persistence
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// I/O error during persistence
    #[error("I/O error: {0}")]
    IoError(String),

    /// Transient I/O error that may succeed on retry
    #[error("Transient I/O error: {0}")]
    TransientIoError(String),
}
