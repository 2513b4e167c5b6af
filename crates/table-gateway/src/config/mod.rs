//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::Path;
use std::sync::Arc;

use crate::catalog::GatewayCatalog;
use crate::drivers::SqliteDatabase;
use crate::error::Result;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Describe the configured database. Nothing is opened until first use.
    pub fn connect(&self) -> Arc<SqliteDatabase> {
        Arc::new(self.database.open())
    }

    /// Build a catalog over a new connection with every configured table registered.
    pub fn build_catalog(&self) -> Result<GatewayCatalog> {
        let mut catalog = GatewayCatalog::new(self.connect());
        for (name, table) in &self.tables {
            catalog.register_table(name.clone(), table.columns.clone(), table.id_column.clone())?;
        }
        Ok(catalog)
    }
}

impl DatabaseConfig {
    /// Lazily connected database for these settings.
    pub fn open(&self) -> SqliteDatabase {
        SqliteDatabase::with_options(self.path.clone(), self.read_only, self.create_if_missing)
    }
}
