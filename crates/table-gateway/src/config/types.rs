//! Configuration type definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::types::TypeMap;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection settings.
    pub database: DatabaseConfig,

    /// Table definitions, keyed by table name, in file order.
    #[serde(default)]
    pub tables: IndexMap<String, TableConfig>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database type (only "sqlite" for now).
    #[serde(default = "default_sqlite")]
    pub r#type: String,

    /// Database file path, or ":memory:".
    pub path: String,

    /// Open the database read-only (default: false).
    #[serde(default)]
    pub read_only: bool,

    /// Create the database file if it does not exist (default: true).
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

/// One table's definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Primary-key column (default: "id").
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Declared column types.
    #[serde(default)]
    pub columns: TypeMap,
}

fn default_sqlite() -> String {
    "sqlite".to_string()
}

fn default_true() -> bool {
    true
}

fn default_id_column() -> String {
    "id".to_string()
}
