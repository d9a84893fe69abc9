//! `staffbook` - A terminal employee record manager
//!
//! This library provides the record types, field validators, storage
//! backends, the failure-sentinel gateway and the interactive session used by
//! the `staffbook` binary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod display;
pub mod employee;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod ordinal;
pub mod session;
pub mod storage;
pub mod validate;

pub use config::Config;
pub use employee::{Credential, Employee, RecordId};
pub use error::{Error, Result};
pub use gateway::{Failure, Gateway, Lookup, UpdateOutcome};
pub use logging::init_logging;
pub use ordinal::OrdinalMap;
pub use session::{Console, Session, State};
pub use storage::RecordStore;
