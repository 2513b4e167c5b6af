//! Table Data Gateway: all SQL for one database table.
//!
//! A [`TableDataGateway`] is bound to one table, its primary-key column and a
//! declared [`TypeMap`]. It generates parameterized SQL (see [`sql`]), caches
//! prepared statements by SQL text, binds values with their declared column
//! types and coerces result rows back to those types.
//!
//! # Statement cache
//!
//! Statements are keyed by exact SQL text. Because values are always bound
//! through placeholders, calls with the same column shape share one prepared
//! statement regardless of the values. A statement that fails to prepare is
//! never cached.
//!
//! # Concurrency
//!
//! The cache lock is held for the whole prepare → bind → execute → fetch
//! sequence, so concurrent callers of one gateway are serialized.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use table_gateway::{record, ColumnType, SqliteDatabase, TableDataGateway, TypeMap, Value};
//!
//! # fn main() -> table_gateway::Result<()> {
//! let db = Arc::new(SqliteDatabase::new("app.db"));
//! let types = TypeMap::from([
//!     ("id".to_string(), ColumnType::Integer),
//!     ("name".to_string(), ColumnType::String),
//! ]);
//! let users = TableDataGateway::new(db, "users", "id", types)?;
//!
//! let id = users.insert(&record([("name", "alice")]))?;
//! let row = users.find(id)?;
//! assert_eq!(row["name"], Value::from("alice"));
//! # Ok(())
//! # }
//! ```

pub mod sql;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::core::identifier::check_identifier;
use crate::core::traits::{Connection, DriverError, Statement};
use crate::core::types::{ColumnType, TypeMap};
use crate::core::value::{Criteria, Record, Value};
use crate::error::{GatewayError, Result};

use self::sql::CRITERION_SUFFIX;

/// Gateway to a single database table.
pub struct TableDataGateway {
    connection: Arc<dyn Connection>,
    table: String,
    id_column: String,
    types: TypeMap,
    statements: Mutex<HashMap<String, Box<dyn Statement>>>,
}

impl TableDataGateway {
    /// Create a gateway for `table` with primary key `id_column`.
    ///
    /// Nothing touches the database here. Fails with `Config` if the table or
    /// id column name is not a safe identifier.
    pub fn new(
        connection: Arc<dyn Connection>,
        table: impl Into<String>,
        id_column: impl Into<String>,
        types: TypeMap,
    ) -> Result<Self> {
        let table = table.into();
        let id_column = id_column.into();

        check_identifier(&table)
            .map_err(|e| GatewayError::Config(format!("Invalid table name: {}", e)))?;
        check_identifier(&id_column).map_err(|e| {
            GatewayError::Config(format!("Invalid ID column for table \"{}\": {}", table, e))
        })?;

        Ok(Self {
            connection,
            table,
            id_column,
            types,
            statements: Mutex::new(HashMap::new()),
        })
    }

    /// Table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Primary-key column name.
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Declared column types.
    pub fn column_types(&self) -> &TypeMap {
        &self.types
    }

    /// Number of prepared statements currently cached.
    pub fn cached_statement_count(&self) -> usize {
        self.statements.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Declared type of `column`. A trailing criterion suffix is ignored
    /// unless a column is declared under the full name.
    ///
    /// Fails with `Database` if the column has no declared type.
    pub fn column_type(&self, column: &str) -> Result<ColumnType> {
        if let Some(column_type) = self.types.get(column) {
            return Ok(*column_type);
        }
        self.declared_type(sql::strip_criterion_suffix(column))
    }

    fn declared_type(&self, column: &str) -> Result<ColumnType> {
        self.types.get(column).copied().ok_or_else(|| {
            GatewayError::Database(format!(
                "No type for column \"{}\" in table \"{}\"",
                column, self.table
            ))
        })
    }

    /// Coerce a value read from the database to the column's declared type.
    ///
    /// Columns without a declaration pass through unchanged.
    pub fn type_cast(&self, column: &str, value: Value) -> Value {
        match self.types.get(column) {
            Some(ty) => ty.cast(value),
            None => value,
        }
    }

    /// Return the record with primary key `id`.
    ///
    /// Fails with `InvalidArgument` if `id` is not an integer (before the
    /// connection is touched) and with `NotFound` if no row matches.
    pub fn find(&self, id: impl Into<Value>) -> Result<Record> {
        let id = self.require_integer_id(id.into())?;
        let sql = sql::select_by_id(&self.table, &self.id_column);
        debug!("Find ID {} in table {}", id, self.table);

        self.with_statement(&sql, |stmt| {
            self.bind(stmt, &self.id_column, "", &Value::Integer(id))?;
            stmt.execute()
                .map_err(|e| self.database_error(&format!("Find \"{}\"", id), e))?;

            match stmt.fetch() {
                Some(row) => Ok(self.type_cast_record(row)),
                None => Err(GatewayError::not_found(&self.table, id)),
            }
        })
    }

    /// Return every row matching all `criteria`, in database order.
    ///
    /// No match is an empty vector. Empty criteria are rejected with
    /// `Database` before any SQL is generated.
    pub fn select(&self, criteria: &Criteria) -> Result<Vec<Record>> {
        self.execute_select(criteria, |stmt| {
            stmt.fetch_all()
                .into_iter()
                .map(|row| self.type_cast_record(row))
                .collect()
        })
    }

    /// Return the first row matching all `criteria`, or `None`.
    pub fn select_one(&self, criteria: &Criteria) -> Result<Option<Record>> {
        self.execute_select(criteria, |stmt| {
            stmt.fetch().map(|row| self.type_cast_record(row))
        })
    }

    /// Return every row in the table.
    pub fn find_all(&self) -> Result<Vec<Record>> {
        let sql = sql::select_all(&self.table);
        debug!("FindAll on table {}", self.table);

        self.with_statement(&sql, |stmt| {
            stmt.execute()
                .map_err(|e| self.database_error("FindAll", e))?;
            Ok(stmt
                .fetch_all()
                .into_iter()
                .map(|row| self.type_cast_record(row))
                .collect())
        })
    }

    /// Insert `record` and return the id assigned by the database.
    ///
    /// The record must not carry the primary-key column. An integrity
    /// violation is reported as `ConstraintViolation`.
    pub fn insert(&self, record: &Record) -> Result<i64> {
        if record.is_empty() {
            return Err(GatewayError::Database(format!(
                "Insert into table \"{}\" requires at least one column",
                self.table
            )));
        }
        if record.contains_key(&self.id_column) {
            return Err(GatewayError::Database(format!(
                "Record to insert into table \"{}\" already has an ID",
                self.table
            )));
        }
        self.check_columns(record.keys())?;

        let sql = sql::insert(&self.table, record.keys().map(String::as_str));

        let id = self.with_statement(&sql, |stmt| {
            self.bind_all(stmt, record, "")?;
            stmt.execute().map_err(|e| self.write_error("Insert", e))?;
            Ok(stmt.last_insert_id())
        })?;

        debug!("Inserted ID {} into table {}", id, self.table);
        Ok(id)
    }

    /// Update rows matching `criteria` with the values in `record` and return
    /// the number of rows affected (0 is not an error).
    ///
    /// The primary-key column is never part of the SET list. With empty
    /// `criteria` the record's own primary key selects the row; it must then
    /// be an integer, else `InvalidArgument`.
    pub fn update(&self, record: &Record, criteria: &Criteria) -> Result<u64> {
        let by_id: Criteria;
        let criteria = if criteria.is_empty() {
            let id = match record.get(&self.id_column) {
                Some(id) => self.require_integer_id(id.clone())?,
                None => {
                    return Err(GatewayError::InvalidArgument(format!(
                        "Record has no ID column \"{}\"",
                        self.id_column
                    )))
                }
            };
            by_id = Criteria::from([(self.id_column.clone(), Value::Integer(id))]);
            &by_id
        } else {
            criteria
        };

        let values: Vec<(&String, &Value)> = record
            .iter()
            .filter(|(column, _)| **column != self.id_column)
            .collect();
        if values.is_empty() {
            return Err(GatewayError::Database(format!(
                "Update on table \"{}\" has no columns to set",
                self.table
            )));
        }
        self.check_columns(values.iter().map(|(column, _)| *column))?;
        self.check_columns(criteria.keys())?;

        let sql = sql::update(
            &self.table,
            values.iter().map(|(column, _)| column.as_str()),
            criteria.keys().map(String::as_str),
        );

        let affected = self.with_statement(&sql, |stmt| {
            for (column, value) in &values {
                self.bind(stmt, column, "", value)?;
            }
            self.bind_all(stmt, criteria, CRITERION_SUFFIX)?;
            stmt.execute().map_err(|e| self.write_error("Update", e))?;
            Ok(stmt.row_count())
        })?;

        debug!("Updated {} row(s) in table {}", affected, self.table);
        Ok(affected)
    }

    /// Delete the row with primary key `id`.
    ///
    /// Returns true iff exactly one row was removed.
    pub fn delete(&self, id: impl Into<Value>) -> Result<bool> {
        let id = self.require_integer_id(id.into())?;
        let sql = sql::delete_by_id(&self.table, &self.id_column);
        debug!("Delete ID {} from table {}", id, self.table);

        self.with_statement(&sql, |stmt| {
            self.bind(stmt, &self.id_column, "", &Value::Integer(id))?;
            stmt.execute()
                .map_err(|e| self.database_error(&format!("Delete ID \"{}\"", id), e))?;
            Ok(stmt.row_count() == 1)
        })
    }

    fn execute_select<T>(
        &self,
        criteria: &Criteria,
        fetch: impl FnOnce(&mut dyn Statement) -> T,
    ) -> Result<T> {
        if criteria.is_empty() {
            return Err(GatewayError::Database(format!(
                "Select on table \"{}\" requires at least one criterion",
                self.table
            )));
        }
        self.check_columns(criteria.keys())?;

        let sql = sql::select_where(&self.table, criteria.keys().map(String::as_str));
        debug!("Select on table {}: {}", self.table, sql);

        self.with_statement(&sql, |stmt| {
            self.bind_all(stmt, criteria, "")?;
            stmt.execute()
                .map_err(|e| self.database_error("Select", e))?;
            Ok(fetch(stmt))
        })
    }

    /// Run `f` against the cached statement for `sql`, preparing it on a miss.
    fn with_statement<T>(
        &self,
        sql: &str,
        f: impl FnOnce(&mut dyn Statement) -> Result<T>,
    ) -> Result<T> {
        let mut statements = self.statements.lock().map_err(|_| {
            GatewayError::Database(format!(
                "Statement cache of table \"{}\" is poisoned",
                self.table
            ))
        })?;

        let statement = match statements.entry(sql.to_string()) {
            Entry::Occupied(entry) => {
                debug!("Statement cache hit: {}", sql);
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                let statement = self
                    .connection
                    .prepare(sql)
                    .map_err(|e| self.database_error("Prepare", e))?;
                debug!("Statement cache miss, prepared: {}", sql);
                entry.insert(statement)
            }
        };

        f(&mut **statement)
    }

    fn bind(&self, stmt: &mut dyn Statement, column: &str, suffix: &str, value: &Value) -> Result<()> {
        let column_type = self.declared_type(column)?;
        stmt.bind_value(&sql::placeholder(column, suffix), value, column_type)
            .map_err(|e| self.database_error("Bind", e))
    }

    fn bind_all(&self, stmt: &mut dyn Statement, values: &Record, suffix: &str) -> Result<()> {
        for (column, value) in values {
            self.bind(stmt, column, suffix, value)?;
        }
        Ok(())
    }

    fn type_cast_record(&self, record: Record) -> Record {
        record
            .into_iter()
            .map(|(column, value)| {
                let value = self.type_cast(&column, value);
                (column, value)
            })
            .collect()
    }

    fn check_columns<'a>(&self, columns: impl IntoIterator<Item = &'a String>) -> Result<()> {
        for column in columns {
            check_identifier(column).map_err(|e| {
                GatewayError::Database(format!(
                    "Invalid column name for table \"{}\": {}",
                    self.table, e
                ))
            })?;
        }
        Ok(())
    }

    fn require_integer_id(&self, id: Value) -> Result<i64> {
        id.as_i64().ok_or_else(|| {
            GatewayError::InvalidArgument(format!("ID \"{}\" is not an integer", id))
        })
    }

    fn database_error(&self, operation: &str, err: DriverError) -> GatewayError {
        match &err {
            DriverError::Connect(message) => GatewayError::Connection(message.clone()),
            DriverError::Sql { .. } => GatewayError::Database(format!(
                "{} failed on table \"{}\": {}",
                operation, self.table, err
            )),
        }
    }

    /// Like `database_error`, but integrity violations become `ConstraintViolation`.
    fn write_error(&self, operation: &str, err: DriverError) -> GatewayError {
        if err.is_integrity_violation() {
            warn!(
                "{} on table {} violated a constraint: {}",
                operation,
                self.table,
                err.message()
            );
            return GatewayError::constraint_violation(&self.table, err.message());
        }
        self.database_error(operation, err)
    }
}

impl fmt::Debug for TableDataGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableDataGateway")
            .field("table", &self.table)
            .field("id_column", &self.id_column)
            .field("types", &self.types)
            .field("cached_statements", &self.cached_statement_count())
            .finish()
    }
}
