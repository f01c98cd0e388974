//! # Record Store Errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::record::PlotCheckKey;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The sink could not be written or read; the record is not saved
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A plot check with the same primary key already exists
    #[error("Duplicate record: {0}")]
    DuplicateRecord(PlotCheckKey),

    /// A foreign key or CHECK constraint rejected the row
    #[error("Constraint violation ({constraint}): {message}")]
    ConstraintViolation { constraint: String, message: String },

    /// An existing file does not have the expected layout
    #[error("Malformed file {path}: {reason}")]
    MalformedFile { path: PathBuf, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn constraint(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::ConstraintViolation {
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "ABQ_STORE_IO_ERROR",
            StoreError::DuplicateRecord(_) => "ABQ_DUPLICATE_RECORD",
            StoreError::ConstraintViolation { .. } => "ABQ_CONSTRAINT_VIOLATION",
            StoreError::MalformedFile { .. } => "ABQ_MALFORMED_FILE",
            StoreError::Database(_) => "ABQ_DATABASE_ERROR",
        }
    }

    /// Whether the caller can correct the input and try again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateRecord(_) | StoreError::ConstraintViolation { .. }
        )
    }

    /// Name of the violated constraint, if any
    pub fn constraint_name(&self) -> Option<&str> {
        match self {
            StoreError::ConstraintViolation { constraint, .. } => Some(constraint),
            _ => None,
        }
    }
}
