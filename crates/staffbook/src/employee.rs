//! Core record types for staffbook.
//!
//! An [`Employee`] is constructed in memory by the add and modify workflows and
//! only gains a [`RecordId`] once the store has persisted it. Updates always
//! replace all six fields.

use std::fmt;

/// Opaque persistent identifier assigned by the backing store.
///
/// For MongoDB this is the hex form of the document's `ObjectId`; for the
/// SQLite store it is the row id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap a store-assigned identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as the store renders it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One employee record.
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    /// Store-assigned identifier; `None` until the record has been inserted.
    pub id: Option<RecordId>,
    /// Full name, letters and spaces.
    pub name: String,
    /// Job title, letters and spaces.
    pub designation: String,
    /// Salary, at least 500.
    pub salary: f64,
    /// Age in years, 18 to 99.
    pub age: u8,
    /// Ten-digit phone number.
    pub phone: u64,
    /// Postal address.
    pub address: String,
}

impl Employee {
    /// Create a record that has not been persisted yet.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        designation: impl Into<String>,
        salary: f64,
        age: u8,
        phone: u64,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            designation: designation.into(),
            salary,
            age,
            phone,
            address: address.into(),
        }
    }

    /// Attach the identifier the store assigned.
    #[must_use]
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// The persistent identifier, if this record has been stored.
    #[must_use]
    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    /// Compare the six data fields, ignoring the identifier.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn same_fields(&self, other: &Self) -> bool {
        self.name == other.name
            && self.designation == other.designation
            && self.salary == other.salary
            && self.age == other.age
            && self.phone == other.phone
            && self.address == other.address
    }
}

/// A login credential as stored in the users collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Lookup key.
    pub email: String,
    /// Compared verbatim at login.
    pub password: String,
}

impl Credential {
    /// Create a credential.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check a submitted password against the stored one.
    #[must_use]
    pub fn matches_password(&self, password: &str) -> bool {
        self.password == password
    }
}
