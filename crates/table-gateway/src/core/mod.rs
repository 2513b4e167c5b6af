//! Core abstractions shared by the gateway, record set and drivers.
//!
//! - [`value`]: scalar values and ordered records
//! - [`types`]: declared column types and bind/cast conversions
//! - [`identifier`]: validation of table and column names spliced into SQL
//! - [`traits`]: the connection/statement boundary implemented by drivers

pub mod identifier;
pub mod traits;
pub mod types;
pub mod value;

pub use traits::{Connection, DriverError, DriverResult, Statement};
pub use types::{ColumnType, TypeMap};
pub use value::{record, Criteria, Record, Value};
