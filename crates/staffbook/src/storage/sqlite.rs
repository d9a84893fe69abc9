//! Local `SQLite` record store.
//!
//! Rows mirror the document fields one-to-one. The row id is the record
//! identifier, and natural order is row id order. Search goes through a
//! `REGEXP` function backed by the `regex` crate so matching behaves the same
//! as the MongoDB `$regex` path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::employee::{Credential, Employee, RecordId};
use crate::error::{Error, Result};

use super::schema;
use super::{RecordStore, UpdateCounts};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

const SELECT_STAFF: &str =
    "SELECT id, name, designation, salary, age, phone, address FROM staff";

/// `SQLite`-backed implementation of [`RecordStore`].
#[derive(Debug)]
pub struct SqliteStore {
    /// Database connection.
    conn: Connection,
}

/// A staff row before its values are checked against the record type.
struct StaffRow {
    id: i64,
    name: String,
    designation: String,
    salary: f64,
    age: i64,
    phone: i64,
    address: String,
}

impl StaffRow {
    fn read(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            designation: row.get(2)?,
            salary: row.get(3)?,
            age: row.get(4)?,
            phone: row.get(5)?,
            address: row.get(6)?,
        })
    }

    fn into_employee(self) -> Result<Employee> {
        let id = self.id.to_string();
        let age = u8::try_from(self.age)
            .map_err(|_| Error::malformed(&id, "age", format!("is out of range: {}", self.age)))?;
        let phone = u64::try_from(self.phone)
            .map_err(|_| Error::malformed(&id, "phone", format!("is negative: {}", self.phone)))?;

        Ok(Employee::new(
            self.name,
            self.designation,
            self.salary,
            age,
            phone,
            self.address,
        )
        .with_id(RecordId::new(id)))
    }
}

impl SqliteStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::prepare(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { conn })
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::prepare(&conn)?;

        Ok(Self { conn })
    }

    fn prepare(conn: &Connection) -> Result<()> {
        conn.create_scalar_function(
            "regexp",
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let pattern: Arc<Regex> = ctx.get_or_create_aux(0, |vr| -> std::result::Result<_, BoxError> {
                    Ok(Regex::new(vr.as_str()?)?)
                })?;
                let text: String = ctx.get(1)?;
                Ok(pattern.is_match(&text))
            },
        )?;
        schema::initialize_schema(conn)
    }

    fn collect(&self, sql: &str, term: Option<&str>) -> Result<Vec<Employee>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = match term {
            Some(pattern) => stmt
                .query_map([pattern], StaffRow::read)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], StaffRow::read)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };
        rows.into_iter().map(StaffRow::into_employee).collect()
    }

    fn row_id(id: &RecordId) -> Option<i64> {
        id.as_str().parse().ok()
    }

    fn phone_param(employee: &Employee) -> Result<i64> {
        i64::try_from(employee.phone)
            .map_err(|_| Error::internal(format!("phone number out of range: {}", employee.phone)))
    }
}

impl RecordStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn ping(&self) -> Result<()> {
        self.conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    fn find_credential(&self, email: &str) -> Result<Option<Credential>> {
        let credential = self
            .conn
            .query_row(
                "SELECT email, password FROM users WHERE email = ?1",
                [email],
                |row| Ok(Credential::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(credential)
    }

    fn put_credential(&self, credential: &Credential) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO users (email, password) VALUES (?1, ?2)
            ON CONFLICT(email) DO UPDATE SET password = excluded.password
            ",
            params![credential.email, credential.password],
        )?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<Employee>> {
        self.collect(&format!("{SELECT_STAFF} ORDER BY id"), None)
    }

    fn insert(&self, employee: &Employee) -> Result<RecordId> {
        self.conn.execute(
            r"
            INSERT INTO staff (name, designation, salary, age, phone, address)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                employee.name,
                employee.designation,
                employee.salary,
                i64::from(employee.age),
                Self::phone_param(employee)?,
                employee.address,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted employee with id {}", id);
        Ok(RecordId::new(id.to_string()))
    }

    fn get(&self, id: &RecordId) -> Result<Option<Employee>> {
        let Some(row_id) = Self::row_id(id) else {
            return Ok(None);
        };
        let row = self
            .conn
            .query_row(
                &format!("{SELECT_STAFF} WHERE id = ?1"),
                [row_id],
                StaffRow::read,
            )
            .optional()?;
        row.map(StaffRow::into_employee).transpose()
    }

    fn update(&self, id: &RecordId, employee: &Employee) -> Result<UpdateCounts> {
        let Some(current) = self.get(id)? else {
            return Ok(UpdateCounts::default());
        };
        if current.same_fields(employee) {
            return Ok(UpdateCounts {
                matched: 1,
                modified: 0,
            });
        }

        let affected = self.conn.execute(
            r"
            UPDATE staff
            SET name = ?1, designation = ?2, salary = ?3, age = ?4, phone = ?5, address = ?6
            WHERE id = ?7
            ",
            params![
                employee.name,
                employee.designation,
                employee.salary,
                i64::from(employee.age),
                Self::phone_param(employee)?,
                employee.address,
                Self::row_id(id),
            ],
        )?;
        let affected = affected as u64;
        Ok(UpdateCounts {
            matched: affected,
            modified: affected,
        })
    }

    fn delete(&self, id: &RecordId) -> Result<u64> {
        let Some(row_id) = Self::row_id(id) else {
            return Ok(0);
        };
        let affected = self
            .conn
            .execute("DELETE FROM staff WHERE id = ?1", [row_id])?;
        Ok(affected as u64)
    }

    fn search(&self, term: &str) -> Result<Vec<Employee>> {
        let pattern = format!("(?i){}", regex::escape(term));
        self.collect(
            &format!(
                "{SELECT_STAFF} WHERE name REGEXP ?1 OR designation REGEXP ?1 OR address REGEXP ?1 ORDER BY id"
            ),
            Some(&pattern),
        )
    }
}
