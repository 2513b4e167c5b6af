//! Configuration validation.

use super::Config;
use crate::core::identifier::check_identifier;
use crate::core::types::ColumnType;
use crate::error::{GatewayError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Database validation
    if config.database.r#type != "sqlite" {
        return Err(GatewayError::Config(format!(
            "database.type must be 'sqlite', got '{}'",
            config.database.r#type
        )));
    }
    if config.database.path.is_empty() {
        return Err(GatewayError::Config("database.path is required".into()));
    }

    // Table validation
    if config.tables.is_empty() {
        return Err(GatewayError::Config(
            "at least one table must be configured".into(),
        ));
    }

    for (name, table) in &config.tables {
        check_identifier(name)
            .map_err(|e| GatewayError::Config(format!("tables: {}", e)))?;

        for column in table.columns.keys() {
            check_identifier(column)
                .map_err(|e| GatewayError::Config(format!("tables.{}.columns: {}", name, e)))?;
        }

        match table.columns.get(&table.id_column) {
            Some(ColumnType::Integer) => {}
            Some(other) => {
                return Err(GatewayError::Config(format!(
                    "tables.{}: id column '{}' must be integer, got '{}'",
                    name, table.id_column, other
                )))
            }
            None => {
                return Err(GatewayError::Config(format!(
                    "tables.{}: id column '{}' is not declared in columns",
                    name, table.id_column
                )))
            }
        }
    }

    Ok(())
}
