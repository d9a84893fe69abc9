//! Storage layer for staffbook.
//!
//! [`RecordStore`] is the raw document-store interface: two logical
//! collections, one of credentials and one of employee records. Two
//! implementations exist:
//!
//! - [`mongo::MongoStore`]: MongoDB through the driver's blocking API.
//! - [`sqlite::SqliteStore`]: a local SQLite file (or in-memory database)
//!   whose tables mirror the document fields.
//!
//! Store methods report every failure as an [`Error`](crate::Error); turning
//! connectivity faults into failure values is the gateway's job.

pub mod document;
pub mod mongo;
pub mod schema;
pub mod sqlite;

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::{redact_uri, DatabaseConfig};
use crate::employee::{Credential, Employee, RecordId};
use crate::error::{Error, Result};

/// Connection string selecting the in-memory SQLite store.
pub const SQLITE_MEMORY_URI: &str = "sqlite::memory:";

const SQLITE_PREFIX: &str = "sqlite://";

/// Matched and modified document counts from an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateCounts {
    /// Documents whose identifier matched.
    pub matched: u64,
    /// Documents whose stored values actually changed.
    pub modified: u64,
}

/// Operations the backing document store must provide.
pub trait RecordStore: std::fmt::Debug {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Verify the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn ping(&self) -> Result<()>;

    /// Find the credential stored under `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the document is malformed.
    fn find_credential(&self, email: &str) -> Result<Option<Credential>>;

    /// Insert or replace a credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put_credential(&self, credential: &Credential) -> Result<()>;

    /// All employee records in the store's natural order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or any document is malformed.
    fn list(&self) -> Result<Vec<Employee>>;

    /// Insert a new record and return the identifier the store assigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn insert(&self, employee: &Employee) -> Result<RecordId>;

    /// Fetch one record by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the document is malformed.
    fn get(&self, id: &RecordId) -> Result<Option<Employee>>;

    /// Overwrite all six fields of the record with `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn update(&self, id: &RecordId, employee: &Employee) -> Result<UpdateCounts>;

    /// Remove the record with `id`, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete(&self, id: &RecordId) -> Result<u64>;

    /// Records whose name, designation or address contains `term`,
    /// ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or any document is malformed.
    fn search(&self, term: &str) -> Result<Vec<Employee>>;
}

/// Which store a connection string selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// A MongoDB deployment.
    Mongo(String),
    /// A SQLite database file.
    SqliteFile(PathBuf),
    /// A private in-memory SQLite database.
    SqliteMemory,
}

impl Backend {
    /// Classify a connection string by its scheme.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDatabaseUri`] for unknown schemes or an empty
    /// SQLite path.
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://") {
            return Ok(Self::Mongo(uri.to_string()));
        }
        if uri == SQLITE_MEMORY_URI {
            return Ok(Self::SqliteMemory);
        }
        if let Some(path) = uri.strip_prefix(SQLITE_PREFIX) {
            if !path.is_empty() {
                return Ok(Self::SqliteFile(PathBuf::from(path)));
            }
        }
        Err(Error::InvalidDatabaseUri {
            uri: redact_uri(uri),
        })
    }
}

/// Open the store named by `config` and check that it answers.
///
/// # Errors
///
/// Returns an error if no URI is configured, the URI is not supported, or the
/// store cannot be reached.
pub fn open(config: &DatabaseConfig) -> Result<Box<dyn RecordStore>> {
    let uri = config.uri.as_deref().ok_or_else(|| Error::ConfigValidation {
        message: "no database uri configured (set STAFFBOOK_DATABASE__URI or MONGODB_URI)"
            .to_string(),
    })?;

    let store: Box<dyn RecordStore> = match Backend::parse(uri)? {
        Backend::Mongo(uri) => Box::new(mongo::MongoStore::connect(&uri, config)?),
        Backend::SqliteFile(path) => Box::new(sqlite::SqliteStore::open(path)?),
        Backend::SqliteMemory => Box::new(sqlite::SqliteStore::open_in_memory()?),
    };

    debug!("Pinging {} store", store.name());
    store.ping()?;
    info!("Connected to {} store", store.name());
    Ok(store)
}
