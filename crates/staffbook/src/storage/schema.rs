//! `SQLite` schema definitions for the local store.
//!
//! The tables mirror the document collections: one row per credential and one
//! row per employee, with the row id standing in for the document identifier.

use rusqlite::Connection;

use crate::error::Result;

/// SQL statement to create the credentials table.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    email TEXT PRIMARY KEY,
    password TEXT NOT NULL
)
";

/// SQL statement to create the employee records table.
pub const CREATE_STAFF_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS staff (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    designation TEXT NOT NULL,
    salary REAL NOT NULL,
    age INTEGER NOT NULL,
    phone INTEGER NOT NULL,
    address TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_USERS_TABLE, CREATE_STAFF_TABLE];

/// Create all tables that don't exist yet.
///
/// # Errors
///
/// Returns an error if a statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}
