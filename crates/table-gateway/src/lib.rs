//! # table-gateway
//!
//! Table Data Gateway and in-memory record sets over SQL databases.
//!
//! This library provides:
//!
//! - **Gateways** that generate parameterized SQL for one table
//! - **Prepared statement caching** keyed by SQL text
//! - **Typed binding and coercion** driven by declared column types
//! - **Record sets** indexing fetched rows by primary key
//! - **A gateway catalog** handing out one shared gateway per table
//! - **Lazy SQLite connections** via rusqlite
//!
//! ## Example
//!
//! ```rust,no_run
//! use table_gateway::{record, Config};
//!
//! fn main() -> table_gateway::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let catalog = config.build_catalog()?;
//!     let users = catalog.get_table_gateway("users")?;
//!     let id = users.insert(&record([("name", "alice")]))?;
//!     println!("{:?}", users.find(id)?);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod gateway;
pub mod recordset;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use catalog::{GatewayCatalog, TableDefinition};
pub use config::{Config, DatabaseConfig, TableConfig};
pub use core::{
    record, ColumnType, Connection, Criteria, DriverError, DriverResult, Record, Statement,
    TypeMap, Value,
};
pub use drivers::{SqliteDatabase, SqliteStatement};
pub use error::{GatewayError, Result};
pub use gateway::TableDataGateway;
pub use recordset::{RecordSet, RecordStore};
