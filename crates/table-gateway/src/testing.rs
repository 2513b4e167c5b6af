//! Shared fixtures and connection doubles for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::traits::{Connection, DriverError, DriverResult, Statement};
use crate::core::types::{ColumnType, TypeMap};
use crate::core::value::{Record, Value};
use crate::drivers::SqliteDatabase;
use crate::gateway::TableDataGateway;

pub const FIXTURE_SQL: &str = include_str!("../tests/fixtures/fixture.sql");

/// In-memory SQLite database loaded with the fixture.
pub fn fixture_db() -> Arc<SqliteDatabase> {
    let db = SqliteDatabase::new(":memory:");
    db.execute_batch(FIXTURE_SQL).expect("fixture should load");
    Arc::new(db)
}

/// Types for the `Test` table. `col99` exists in the table but is
/// deliberately left undeclared.
pub fn test_types() -> TypeMap {
    TypeMap::from([
        ("id".to_string(), ColumnType::Integer),
        ("col1".to_string(), ColumnType::String),
        ("col2".to_string(), ColumnType::Integer),
        ("col3".to_string(), ColumnType::Boolean),
    ])
}

pub fn account_types() -> TypeMap {
    TypeMap::from([
        ("id".to_string(), ColumnType::Integer),
        ("email".to_string(), ColumnType::String),
        ("owner".to_string(), ColumnType::Integer),
    ])
}

/// Gateway for the `Test` table over `connection`.
pub fn test_gateway(connection: Arc<dyn Connection>) -> TableDataGateway {
    TableDataGateway::new(connection, "Test", "id", test_types()).expect("valid gateway")
}

/// Wraps a connection and counts `prepare` calls.
pub struct CountingConnection {
    inner: Arc<dyn Connection>,
    prepares: AtomicUsize,
}

impl CountingConnection {
    pub fn new(inner: Arc<dyn Connection>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            prepares: AtomicUsize::new(0),
        })
    }

    pub fn prepare_count(&self) -> usize {
        self.prepares.load(Ordering::SeqCst)
    }
}

impl Connection for CountingConnection {
    fn prepare(&self, sql: &str) -> DriverResult<Box<dyn Statement>> {
        self.prepares.fetch_add(1, Ordering::SeqCst);
        self.inner.prepare(sql)
    }

    fn last_insert_id(&self) -> DriverResult<i64> {
        self.inner.last_insert_id()
    }
}

/// Connection whose statements always fail to execute.
pub struct FailingConnection;

struct FailingStatement;

impl Connection for FailingConnection {
    fn prepare(&self, _sql: &str) -> DriverResult<Box<dyn Statement>> {
        Ok(Box::new(FailingStatement))
    }

    fn last_insert_id(&self) -> DriverResult<i64> {
        Ok(0)
    }
}

impl Statement for FailingStatement {
    fn bind_value(&mut self, _: &str, _: &Value, _: ColumnType) -> DriverResult<()> {
        Ok(())
    }

    fn execute(&mut self) -> DriverResult<()> {
        Err(DriverError::sql(
            "HY000",
            1,
            "simulated error for unit testing purposes",
        ))
    }

    fn fetch(&mut self) -> Option<Record> {
        None
    }

    fn fetch_all(&mut self) -> Vec<Record> {
        Vec::new()
    }

    fn row_count(&self) -> u64 {
        0
    }

    fn last_insert_id(&self) -> i64 {
        0
    }
}
