//! Error types for staffbook.
//!
//! This module defines all error types used throughout the staffbook crate.
//! Driver errors are classified when they are converted: anything that means
//! "the store could not be reached" becomes [`Error::Connection`], which is the
//! only fault the gateway treats as transient.

use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

/// The main error type for staffbook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the SQLite database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A SQLite query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[source] rusqlite::Error),

    /// A MongoDB operation failed for a reason other than connectivity.
    #[error("document store operation failed: {0}")]
    Mongo(#[source] mongodb::error::Error),

    /// The backing store could not be reached.
    #[error("lost connection to the database: {message}")]
    Connection {
        /// Driver-provided description of the fault.
        message: String,
    },

    /// A stored document is missing a field or holds a value of the wrong type.
    #[error("malformed record {id}: field '{field}' {reason}")]
    MalformedRecord {
        /// Identifier of the offending document, if it had one.
        id: String,
        /// The field that failed to decode.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The configured connection string names no supported backend.
    #[error("unsupported database uri '{uri}' (expected mongodb://, mongodb+srv://, sqlite://<path> or sqlite::memory:)")]
    InvalidDatabaseUri {
        /// The rejected connection string (credentials redacted).
        uri: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Console or file system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The operator's input stream reached end of file.
    #[error("input closed")]
    InputClosed,

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for staffbook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        let unreachable = matches!(
            &err,
            rusqlite::Error::SqliteFailure(failure, _) if matches!(
                failure.code,
                ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::CannotOpen
                    | ErrorCode::SystemIoFailure
            )
        );
        if unreachable {
            Self::connection(err.to_string())
        } else {
            Self::DatabaseQuery(err)
        }
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        let unreachable = matches!(
            *err.kind,
            ErrorKind::Io(_)
                | ErrorKind::ServerSelection { .. }
                | ErrorKind::ConnectionPoolCleared { .. }
                | ErrorKind::DnsResolve { .. }
        );
        if unreachable {
            Self::connection(err.to_string())
        } else {
            Self::Mongo(err)
        }
    }
}

impl Error {
    /// Create a new connectivity error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a malformed record error.
    #[must_use]
    pub fn malformed(id: impl Into<String>, field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            id: id.into(),
            field,
            reason: reason.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is a transient connectivity fault.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Check if this error describes a stored record that failed to decode.
    #[must_use]
    pub fn is_malformed_record(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }

    /// Check if this error means the operator closed the input stream.
    #[must_use]
    pub fn is_input_closed(&self) -> bool {
        matches!(self, Self::InputClosed)
    }
}
