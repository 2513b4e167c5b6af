//! Database driver adapters.
//!
//! Each adapter implements [`Connection`](crate::core::Connection) and
//! [`Statement`](crate::core::Statement) around a native client:
//!
//! - [`sqlite`]: SQLite via rusqlite, with lazy connect
//!
//! # Adding New Databases
//!
//! 1. Create a new module under `drivers/`
//! 2. Implement `Connection` with connect-on-first-use semantics
//! 3. Map the client's constraint failures to SQLSTATE class `23`
//! 4. Accept the new `database.type` in config validation

pub mod sqlite;

pub use sqlite::{SqliteDatabase, SqliteStatement};
