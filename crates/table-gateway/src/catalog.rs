//! Gateway catalog for explicit dependency injection.
//!
//! The [`GatewayCatalog`] holds one connection and the table definitions
//! registered at startup, and hands out one shared [`TableDataGateway`] per
//! table. It is explicitly constructed and passed around rather than kept in
//! a global, so tests can build their own catalogs over fixture databases.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use table_gateway::{ColumnType, GatewayCatalog, SqliteDatabase, TypeMap};
//!
//! # fn main() -> table_gateway::Result<()> {
//! let mut catalog = GatewayCatalog::new(Arc::new(SqliteDatabase::new("app.db")));
//! catalog.register_table(
//!     "users",
//!     TypeMap::from([("id".to_string(), ColumnType::Integer)]),
//!     "id",
//! )?;
//!
//! let users = catalog.get_table_gateway("users")?;
//! assert!(Arc::ptr_eq(&users, &catalog.get_table_gateway("users")?));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use tracing::debug;

use crate::core::identifier::check_identifier;
use crate::core::traits::Connection;
use crate::core::types::TypeMap;
use crate::error::{GatewayError, Result};
use crate::gateway::TableDataGateway;

/// Registered shape of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    /// Primary-key column.
    pub id_column: String,

    /// Declared column types.
    pub types: TypeMap,
}

/// Registry of table definitions and their gateways.
pub struct GatewayCatalog {
    connection: Arc<dyn Connection>,

    /// Definitions in registration order.
    definitions: IndexMap<String, TableDefinition>,

    /// Gateways created so far, one per table.
    gateways: Mutex<HashMap<String, Arc<TableDataGateway>>>,
}

impl GatewayCatalog {
    /// Create an empty catalog over `connection`.
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            definitions: IndexMap::new(),
            gateways: Mutex::new(HashMap::new()),
        }
    }

    /// Register `name` with its column types and primary-key column.
    ///
    /// Re-registering a table replaces its definition and drops any gateway
    /// already built for it.
    pub fn register_table(
        &mut self,
        name: impl Into<String>,
        types: TypeMap,
        id_column: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        let id_column = id_column.into();

        check_identifier(&name)
            .map_err(|e| GatewayError::Config(format!("Invalid table name: {}", e)))?;
        check_identifier(&id_column).map_err(|e| {
            GatewayError::Config(format!("Invalid ID column for table \"{}\": {}", name, e))
        })?;
        for column in types.keys() {
            check_identifier(column).map_err(|e| {
                GatewayError::Config(format!("Invalid column in table \"{}\": {}", name, e))
            })?;
        }

        debug!("Registered table {} (ID column {})", name, id_column);
        if let Ok(mut gateways) = self.gateways.lock() {
            gateways.remove(&name);
        }
        self.definitions
            .insert(name, TableDefinition { id_column, types });
        Ok(())
    }

    /// Shared gateway for `name`, created on first request.
    pub fn get_table_gateway(&self, name: &str) -> Result<Arc<TableDataGateway>> {
        let definition = self.definition(name)?;

        let mut gateways = self
            .gateways
            .lock()
            .map_err(|_| GatewayError::Config("Gateway registry lock poisoned".into()))?;

        if let Some(gateway) = gateways.get(name) {
            return Ok(Arc::clone(gateway));
        }

        let gateway = Arc::new(TableDataGateway::new(
            Arc::clone(&self.connection),
            name,
            definition.id_column.clone(),
            definition.types.clone(),
        )?);
        debug!("Created gateway for table {}", name);
        gateways.insert(name.to_string(), Arc::clone(&gateway));
        Ok(gateway)
    }

    /// Registered definition of `name`.
    pub fn definition(&self, name: &str) -> Result<&TableDefinition> {
        self.definitions
            .get(name)
            .ok_or_else(|| GatewayError::Config(format!("Table \"{}\" not configured", name)))
    }

    /// Registered table names in registration order.
    pub fn tables(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }
}

impl std::fmt::Debug for GatewayCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayCatalog")
            .field("tables", &self.tables())
            .finish()
    }
}
