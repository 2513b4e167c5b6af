//! SQLite adapter for the [`Connection`] boundary, built on rusqlite.
//!
//! [`SqliteDatabase`] connects lazily: construction only records the path and
//! open flags. The first call that needs the database opens it and caches the
//! handle. A failed open leaves the state `Disconnected`, so the next call
//! retries.
//!
//! Statements are compiled once at [`Connection::prepare`] time so malformed
//! SQL fails immediately. Executions go through rusqlite's per-connection
//! statement cache, so a gateway's cached [`SqliteStatement`] re-uses the same
//! compiled statement.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::{ErrorCode, OpenFlags};
use tracing::{debug, info};

use crate::core::traits::{Connection, DriverError, DriverResult, Statement};
use crate::core::types::ColumnType;
use crate::core::value::{Record, Value};

/// SQLSTATE reported for SQLite constraint failures.
const SQLSTATE_INTEGRITY: &str = "23000";

/// SQLSTATE reported for every other SQLite failure.
const SQLSTATE_GENERAL: &str = "HY000";

/// SQLSTATE for a bind against a placeholder the statement does not have.
const SQLSTATE_INVALID_PARAMETER: &str = "HY093";

/// Statement cache capacity of each opened connection.
const STATEMENT_CACHE_CAPACITY: usize = 64;

type SharedHandle = Arc<Mutex<rusqlite::Connection>>;

enum ConnectionState {
    Disconnected,
    Connected(SharedHandle),
}

/// Lazily connected SQLite database.
pub struct SqliteDatabase {
    path: String,
    flags: OpenFlags,
    state: Mutex<ConnectionState>,
}

impl SqliteDatabase {
    /// Describe a read-write database at `path`, created if missing.
    ///
    /// `":memory:"` opens a private in-memory database. Nothing is opened
    /// until first use.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_options(path, false, true)
    }

    /// Describe a database with explicit open options.
    pub fn with_options(path: impl Into<String>, read_only: bool, create_if_missing: bool) -> Self {
        let mut flags = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if read_only {
            flags |= OpenFlags::SQLITE_OPEN_READ_ONLY;
        } else {
            flags |= OpenFlags::SQLITE_OPEN_READ_WRITE;
            if create_if_missing {
                flags |= OpenFlags::SQLITE_OPEN_CREATE;
            }
        }

        Self {
            path: path.into(),
            flags,
            state: Mutex::new(ConnectionState::Disconnected),
        }
    }

    /// Database path as configured.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True once the lazy connection has been established.
    pub fn is_connected(&self) -> bool {
        self.state
            .lock()
            .map(|state| matches!(*state, ConnectionState::Connected(_)))
            .unwrap_or(false)
    }

    /// Run a script of one or more SQL statements (fixtures, bootstrap DDL).
    pub fn execute_batch(&self, sql: &str) -> DriverResult<()> {
        let handle = self.handle()?;
        let conn = lock(&handle)?;
        conn.execute_batch(sql).map_err(DriverError::from)
    }

    /// Connect on first use and return the shared handle.
    fn handle(&self) -> DriverResult<SharedHandle> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DriverError::Connect("connection state lock poisoned".to_string()))?;

        if let ConnectionState::Connected(handle) = &*state {
            return Ok(Arc::clone(handle));
        }

        info!("Connecting to SQLite database {}", self.path);
        let conn = rusqlite::Connection::open_with_flags(&self.path, self.flags)
            .map_err(|e| DriverError::Connect(format!("cannot open '{}': {}", self.path, e)))?;
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);

        let handle = Arc::new(Mutex::new(conn));
        *state = ConnectionState::Connected(Arc::clone(&handle));
        Ok(handle)
    }
}

impl std::fmt::Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDatabase")
            .field("path", &self.path)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl Connection for SqliteDatabase {
    fn prepare(&self, sql: &str) -> DriverResult<Box<dyn Statement>> {
        let handle = self.handle()?;
        {
            let conn = lock(&handle)?;
            // Compile now to surface syntax and unknown-column errors; the
            // compiled statement goes back into rusqlite's cache on drop.
            conn.prepare_cached(sql).map_err(DriverError::from)?;
        }
        debug!("Prepared SQLite statement: {}", sql);

        Ok(Box::new(SqliteStatement {
            sql: sql.to_string(),
            handle,
            bindings: Vec::new(),
            rows: VecDeque::new(),
            row_count: 0,
            last_insert_id: 0,
        }))
    }

    fn last_insert_id(&self) -> DriverResult<i64> {
        let handle = self.handle()?;
        let conn = lock(&handle)?;
        Ok(conn.last_insert_rowid())
    }
}

/// A prepared SQLite statement with buffered results.
pub struct SqliteStatement {
    sql: String,
    handle: SharedHandle,
    bindings: Vec<(String, SqliteValue)>,
    rows: VecDeque<Record>,
    row_count: u64,
    last_insert_id: i64,
}

impl Statement for SqliteStatement {
    fn bind_value(
        &mut self,
        name: &str,
        value: &Value,
        column_type: ColumnType,
    ) -> DriverResult<()> {
        let bound = to_sqlite(column_type.bind(value));
        match self.bindings.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = bound,
            None => self.bindings.push((name.to_string(), bound)),
        }
        Ok(())
    }

    fn execute(&mut self) -> DriverResult<()> {
        self.rows.clear();
        self.row_count = 0;

        let conn = lock(&self.handle)?;
        let mut stmt = conn.prepare_cached(&self.sql).map_err(DriverError::from)?;

        for (name, value) in self.bindings.drain(..) {
            let index = stmt
                .parameter_index(&name)
                .map_err(DriverError::from)?
                .ok_or_else(|| {
                    DriverError::sql(
                        SQLSTATE_INVALID_PARAMETER,
                        -1,
                        format!("parameter {} is not defined in: {}", name, self.sql),
                    )
                })?;
            stmt.raw_bind_parameter(index, value)
                .map_err(DriverError::from)?;
        }

        if stmt.column_count() > 0 {
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let mut rows = stmt.raw_query();
            while let Some(row) = rows.next().map_err(DriverError::from)? {
                let mut record = Record::with_capacity(columns.len());
                for (idx, column) in columns.iter().enumerate() {
                    let value = row.get_ref(idx).map_err(DriverError::from)?;
                    record.insert(column.clone(), from_sqlite(value));
                }
                self.rows.push_back(record);
            }
        } else {
            self.row_count = stmt.raw_execute().map_err(DriverError::from)? as u64;
            // Read while the handle is still locked so no other statement on
            // this connection can insert in between.
            self.last_insert_id = conn.last_insert_rowid();
        }

        Ok(())
    }

    fn fetch(&mut self) -> Option<Record> {
        self.rows.pop_front()
    }

    fn fetch_all(&mut self) -> Vec<Record> {
        self.rows.drain(..).collect()
    }

    fn row_count(&self) -> u64 {
        self.row_count
    }

    fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }
}

fn lock(handle: &SharedHandle) -> DriverResult<MutexGuard<'_, rusqlite::Connection>> {
    handle
        .lock()
        .map_err(|_| DriverError::sql(SQLSTATE_GENERAL, -1, "connection lock poisoned"))
}

fn to_sqlite(value: Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Integer(v) => SqliteValue::Integer(v),
        Value::Real(v) => SqliteValue::Real(v),
        Value::Bool(v) => SqliteValue::Integer(i64::from(v)),
        Value::Text(v) => SqliteValue::Text(v),
        Value::Blob(v) => SqliteValue::Blob(v),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(v) => match std::str::from_utf8(v) {
            Ok(text) => Value::Text(text.to_string()),
            // SQLite does not enforce encoding; keep the bytes intact.
            Err(_) => Value::Blob(v.to_vec()),
        },
        ValueRef::Blob(v) => Value::Blob(v.to_vec()),
    }
}

impl From<rusqlite::Error> for DriverError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, message) => {
                let sqlstate = if err.code == ErrorCode::ConstraintViolation {
                    SQLSTATE_INTEGRITY
                } else {
                    SQLSTATE_GENERAL
                };
                DriverError::sql(
                    sqlstate,
                    i64::from(err.extended_code),
                    message.clone().unwrap_or_else(|| e.to_string()),
                )
            }
            _ => DriverError::sql(SQLSTATE_GENERAL, -1, e.to_string()),
        }
    }
}
