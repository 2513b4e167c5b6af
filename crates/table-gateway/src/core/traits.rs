//! Driver boundary consumed by the gateway.
//!
//! - [`Connection`]: prepares statements and reports the last insert id
//! - [`Statement`]: a prepared statement with named placeholders
//!
//! The gateway only ever talks to these traits. A concrete adapter wraps a
//! native client (see [`crate::drivers::sqlite`]); tests substitute doubles.

use thiserror::Error;

use super::types::ColumnType;
use super::value::{Record, Value};

/// SQLSTATE class for integrity constraint violations.
pub const INTEGRITY_CONSTRAINT_CLASS: &str = "23";

/// Error reported by a driver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// The lazy connection could not be established.
    #[error("cannot connect to database: {0}")]
    Connect(String),

    /// A statement failed. Carries the (SQLSTATE, driver code, message) triple.
    #[error("SQLSTATE[{sqlstate}] ({code}): {message}")]
    Sql {
        sqlstate: String,
        code: i64,
        message: String,
    },
}

impl DriverError {
    /// Create a statement error.
    pub fn sql(sqlstate: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        DriverError::Sql {
            sqlstate: sqlstate.into(),
            code,
            message: message.into(),
        }
    }

    /// True if the SQLSTATE identifies an integrity constraint violation (class 23).
    pub fn is_integrity_violation(&self) -> bool {
        match self {
            DriverError::Sql { sqlstate, .. } => sqlstate.starts_with(INTEGRITY_CONSTRAINT_CLASS),
            DriverError::Connect(_) => false,
        }
    }

    /// Human-readable driver message.
    pub fn message(&self) -> &str {
        match self {
            DriverError::Connect(message) | DriverError::Sql { message, .. } => message,
        }
    }
}

/// Result type for driver calls.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// A database connection as seen by the gateway.
///
/// Implementations connect lazily: constructing one never fails, the first
/// call that needs the database does.
pub trait Connection: Send + Sync {
    /// Prepare a statement.
    ///
    /// Must fail immediately for malformed SQL or unknown tables/columns.
    fn prepare(&self, sql: &str) -> DriverResult<Box<dyn Statement>>;

    /// Id assigned to the most recently inserted row on this connection.
    ///
    /// Another statement sharing the connection may insert in between, so
    /// callers that need the id of their own insert use
    /// [`Statement::last_insert_id`].
    fn last_insert_id(&self) -> DriverResult<i64>;
}

/// A prepared statement with named (`:name`) placeholders.
///
/// A statement may be executed many times; each execution uses the values
/// bound since the previous one and replaces any buffered result rows.
pub trait Statement: Send {
    /// Bind `value` to placeholder `name` (including the leading colon),
    /// converted for the declared column type.
    fn bind_value(&mut self, name: &str, value: &Value, column_type: ColumnType)
        -> DriverResult<()>;

    /// Execute with the currently bound values.
    fn execute(&mut self) -> DriverResult<()>;

    /// Next result row, or `None` when exhausted.
    fn fetch(&mut self) -> Option<Record>;

    /// All remaining result rows.
    fn fetch_all(&mut self) -> Vec<Record>;

    /// Rows affected by the last execution of a data-modifying statement.
    fn row_count(&self) -> u64;

    /// Id of the row inserted by the last execution, captured atomically
    /// with it.
    fn last_insert_id(&self) -> i64;
}
