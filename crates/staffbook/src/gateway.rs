//! Typed record operations over a [`RecordStore`].
//!
//! The gateway is the boundary where store errors stop propagating. Each
//! operation catches failures itself and degrades to the failure value in its
//! signature, logging the cause. Connectivity loss is logged as a warning,
//! anything else as an error. Nothing here retries; the session decides
//! whether to ask the operator to try again.

use tracing::{debug, error, info, warn};

use crate::employee::{Credential, Employee, RecordId};
use crate::error::{Error, Result};
use crate::storage::RecordStore;

/// Why a gateway operation degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The store could not be reached.
    Connectivity,
    /// A stored document failed to decode.
    Malformed,
    /// No document matched the identifier.
    NotFound,
    /// The store rejected the operation for another reason.
    Store,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        if err.is_transient() {
            Self::Connectivity
        } else if err.is_malformed_record() {
            Self::Malformed
        } else {
            Self::Store
        }
    }
}

impl Failure {
    /// Operator-facing description.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Connectivity => "Connection to the database was lost. Please try again.",
            Self::Malformed => "A stored record could not be read.",
            Self::NotFound => "No matching record was found.",
            Self::Store => "The database rejected the operation.",
        }
    }
}

/// Result of a single-record lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The record exists.
    Found(T),
    /// The store answered and holds no such record.
    NotFound,
    /// The lookup could not be completed.
    Failed(Failure),
}

/// Result of a full-record update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// At least one stored value changed.
    Updated,
    /// The record matched but already held these values.
    Unchanged,
    /// The update did not apply.
    Failed(Failure),
}

/// Failure-sentinel interface to the backing store.
#[derive(Debug)]
pub struct Gateway {
    store: Box<dyn RecordStore>,
}

impl Gateway {
    /// Wrap an opened store.
    #[must_use]
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Look up the credential stored under `key` (an email address).
    #[must_use]
    pub fn find_user_by_credential_key(&self, key: &str) -> Lookup<Credential> {
        match self.store.find_credential(key) {
            Ok(Some(credential)) => Lookup::Found(credential),
            Ok(None) => {
                debug!("No credential for {}", key);
                Lookup::NotFound
            }
            Err(err) => Lookup::Failed(self.degrade("find user", &err)),
        }
    }

    /// All records in the store's natural order.
    ///
    /// # Errors
    ///
    /// Returns the failure kind if the list could not be fetched; an empty
    /// store is `Ok(vec![])`.
    pub fn list_records(&self) -> std::result::Result<Vec<Employee>, Failure> {
        self.store.list().map_err(|err| self.degrade("list records", &err))
    }

    /// Persist a new record and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns the failure kind if the insert did not complete.
    pub fn insert_record(&self, employee: &Employee) -> std::result::Result<RecordId, Failure> {
        match self.store.insert(employee) {
            Ok(id) => {
                info!("Added employee {} as {}", employee.name, id);
                Ok(id)
            }
            Err(err) => Err(self.degrade("insert record", &err)),
        }
    }

    /// Fetch one record.
    #[must_use]
    pub fn get_record(&self, id: &RecordId) -> Lookup<Employee> {
        match self.store.get(id) {
            Ok(Some(employee)) => Lookup::Found(employee),
            Ok(None) => Lookup::NotFound,
            Err(err) => Lookup::Failed(self.degrade("get record", &err)),
        }
    }

    /// Overwrite all six fields of the record with `id`.
    #[must_use]
    pub fn update_record(&self, id: &RecordId, employee: &Employee) -> UpdateOutcome {
        match self.store.update(id, employee) {
            Ok(counts) if counts.modified >= 1 => {
                info!("Updated employee {}", id);
                UpdateOutcome::Updated
            }
            Ok(counts) if counts.matched >= 1 => {
                debug!("Employee {} unchanged", id);
                UpdateOutcome::Unchanged
            }
            Ok(_) => {
                debug!("No employee matched {} for update", id);
                UpdateOutcome::Failed(Failure::NotFound)
            }
            Err(err) => UpdateOutcome::Failed(self.degrade("update record", &err)),
        }
    }

    /// Remove the record with `id`. True iff exactly one record was removed.
    #[must_use]
    pub fn delete_record(&self, id: &RecordId) -> bool {
        match self.store.delete(id) {
            Ok(1) => {
                info!("Deleted employee {}", id);
                true
            }
            Ok(removed) => {
                debug!("Delete of {} removed {} records", id, removed);
                false
            }
            Err(err) => {
                self.degrade("delete record", &err);
                false
            }
        }
    }

    /// Records whose name, designation or address contains `term`, ignoring
    /// case. Empty on no match and on failure alike.
    #[must_use]
    pub fn search_records(&self, term: &str) -> Vec<Employee> {
        self.store.search(term).unwrap_or_else(|err| {
            self.degrade("search records", &err);
            Vec::new()
        })
    }

    /// Insert or replace a login credential.
    ///
    /// # Errors
    ///
    /// Returns the store error unchanged.
    pub fn register_user(&self, email: &str, password: &str) -> Result<()> {
        self.store.put_credential(&Credential::new(email, password))?;
        info!("Registered user {}", email);
        Ok(())
    }

    fn degrade(&self, operation: &str, err: &Error) -> Failure {
        let failure = Failure::from(err);
        if failure == Failure::Connectivity {
            warn!("{} on {} store lost connectivity: {}", operation, self.store.name(), err);
        } else {
            error!("{} on {} store failed: {}", operation, self.store.name(), err);
        }
        failure
    }
}
