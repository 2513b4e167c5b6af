//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use table_gateway::{ColumnType, SqliteDatabase, TableDataGateway, TypeMap};
use tempfile::TempDir;

pub const FIXTURE_SQL: &str = include_str!("../fixtures/fixture.sql");

/// Fixture database in a temporary file. Keep the `TempDir` alive for the
/// duration of the test.
pub fn fixture_file() -> (TempDir, Arc<SqliteDatabase>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.db");
    let db = SqliteDatabase::new(path.to_string_lossy().into_owned());
    db.execute_batch(FIXTURE_SQL).unwrap();
    (dir, Arc::new(db))
}

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

pub fn test_gateway(db: Arc<SqliteDatabase>) -> TableDataGateway {
    TableDataGateway::new(db, "Test", "id", test_types()).unwrap()
}
