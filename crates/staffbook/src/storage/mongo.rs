//! MongoDB record store.
//!
//! Uses the driver's blocking API so the session loop stays synchronous.
//! The configured timeout bounds both the connect and server selection
//! phases, so an unreachable cluster surfaces as a connectivity error instead
//! of a long hang.

use std::fmt;
use std::time::Duration;

use mongodb::bson::{doc, Document};
use mongodb::options::UpdateOptions;
use mongodb::sync::{Client, Collection, Database};
use tracing::debug;

use crate::config::{redact_uri, DatabaseConfig};
use crate::employee::{Credential, Employee, RecordId};
use crate::error::Result;

use super::document;
use super::{RecordStore, UpdateCounts};

/// MongoDB-backed implementation of [`RecordStore`].
pub struct MongoStore {
    database: Database,
    users: Collection<Document>,
    staff: Collection<Document>,
    uri: String,
}

impl fmt::Debug for MongoStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoStore")
            .field("uri", &self.uri)
            .field("database", &self.database.name())
            .field("users", &self.users.name())
            .field("staff", &self.staff.name())
            .finish()
    }
}

impl MongoStore {
    /// Create a client for `uri` and bind the configured collections.
    ///
    /// The driver connects lazily; call [`RecordStore::ping`] to check that
    /// the deployment answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string cannot be parsed or resolved.
    pub fn connect(uri: &str, config: &DatabaseConfig) -> Result<Self> {
        let redacted = redact_uri(uri);
        debug!("Creating MongoDB client for {}", redacted);

        let client = Client::with_uri_str(with_timeouts(uri, config.timeout()))?;
        let database = client.database(&config.name);
        let users = database.collection::<Document>(&config.users_collection);
        let staff = database.collection::<Document>(&config.staff_collection);

        Ok(Self {
            database,
            users,
            staff,
            uri: redacted,
        })
    }

    fn collect(&self, filter: Option<Document>) -> Result<Vec<Employee>> {
        let cursor = self.staff.find(filter, None)?;
        let mut records = Vec::new();
        for result in cursor {
            records.push(document::decode_employee(&result?)?);
        }
        Ok(records)
    }
}

impl RecordStore for MongoStore {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }, None)?;
        Ok(())
    }

    fn find_credential(&self, email: &str) -> Result<Option<Credential>> {
        self.users
            .find_one(doc! { "email": email }, None)?
            .map(|found| document::decode_credential(&found))
            .transpose()
    }

    fn put_credential(&self, credential: &Credential) -> Result<()> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.users.update_one(
            doc! { "email": credential.email.as_str() },
            doc! { "$set": document::encode_credential(credential) },
            options,
        )?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<Employee>> {
        self.collect(None)
    }

    fn insert(&self, employee: &Employee) -> Result<RecordId> {
        let encoded = document::encode_employee(employee)?;
        let result = self.staff.insert_one(encoded, None)?;
        let id = document::record_id_from_bson(&result.inserted_id)?;
        debug!("Inserted employee with id {}", id);
        Ok(id)
    }

    fn get(&self, id: &RecordId) -> Result<Option<Employee>> {
        self.staff
            .find_one(document::id_filter(id), None)?
            .map(|found| document::decode_employee(&found))
            .transpose()
    }

    fn update(&self, id: &RecordId, employee: &Employee) -> Result<UpdateCounts> {
        let encoded = document::encode_employee(employee)?;
        let result = self.staff.update_one(
            document::id_filter(id),
            doc! { "$set": encoded },
            None,
        )?;
        Ok(UpdateCounts {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    fn delete(&self, id: &RecordId) -> Result<u64> {
        let result = self.staff.delete_one(document::id_filter(id), None)?;
        Ok(result.deleted_count)
    }

    fn search(&self, term: &str) -> Result<Vec<Employee>> {
        self.collect(Some(document::search_filter(term)))
    }
}

/// Append connect and server selection timeouts to a connection string
/// unless it already sets them.
#[must_use]
pub fn with_timeouts(uri: &str, timeout: Duration) -> String {
    let timeout_ms = timeout.as_millis();
    let mut params = Vec::new();
    for key in ["serverSelectionTimeoutMS", "connectTimeoutMS"] {
        if !uri.contains(&format!("{key}=")) {
            params.push(format!("{key}={timeout_ms}"));
        }
    }
    if params.is_empty() {
        return uri.to_string();
    }
    let params = params.join("&");

    if uri.contains('?') {
        let sep = if uri.ends_with('?') || uri.ends_with('&') { "" } else { "&" };
        return format!("{uri}{sep}{params}");
    }

    let has_path = uri
        .split_once("://")
        .is_some_and(|(_, rest)| rest.contains('/'));
    if has_path {
        format!("{uri}?{params}")
    } else {
        format!("{uri}/?{params}")
    }
}
