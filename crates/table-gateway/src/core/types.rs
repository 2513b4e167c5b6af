//! Declared column types.
//!
//! Every table carries a [`TypeMap`] from column name to [`ColumnType`]. The
//! gateway consults it when binding parameters and when coercing result rows.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::value::Value;
use crate::error::{GatewayError, Result};

/// Declared scalar type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Null,
    #[serde(alias = "int", alias = "bigint")]
    Integer,
    #[serde(alias = "real", alias = "double")]
    Float,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "str", alias = "text", alias = "varchar")]
    String,
    #[serde(alias = "lob", alias = "binary")]
    Blob,
}

/// Column name → declared type, in declaration order.
pub type TypeMap = IndexMap<String, ColumnType>;

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Null => "null",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::String => "string",
            ColumnType::Blob => "blob",
        }
    }

    /// Coerce a value read from the database to this declared type.
    ///
    /// Only integer and boolean columns are cast; every other type passes the
    /// value through unchanged.
    #[must_use]
    pub fn cast(self, value: Value) -> Value {
        match self {
            ColumnType::Integer => value.to_integer(),
            ColumnType::Boolean => value.to_boolean(),
            _ => value,
        }
    }

    /// Convert a value to the representation a driver should bind for this type.
    ///
    /// NULL always binds as NULL.
    #[must_use]
    pub fn bind(self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }

        match self {
            ColumnType::Null => Value::Null,
            ColumnType::Integer => match value {
                Value::Text(s) => match s.trim().parse::<i64>() {
                    Ok(v) => Value::Integer(v),
                    // Let the database decide what to do with non-numeric text.
                    Err(_) => value.clone(),
                },
                Value::Blob(_) => value.clone(),
                other => other.to_integer(),
            },
            ColumnType::Boolean => match value.to_boolean() {
                Value::Bool(b) => Value::Integer(i64::from(b)),
                other => other,
            },
            ColumnType::Float => match value {
                Value::Integer(v) => Value::Real(*v as f64),
                Value::Bool(v) => Value::Real(if *v { 1.0 } else { 0.0 }),
                Value::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Real)
                    .unwrap_or_else(|_| value.clone()),
                other => other.clone(),
            },
            ColumnType::String => match value {
                Value::Text(_) | Value::Blob(_) => value.clone(),
                Value::Bool(v) => Value::Text(if *v { "1" } else { "0" }.to_string()),
                other => Value::Text(other.to_string()),
            },
            ColumnType::Blob => match value {
                Value::Blob(_) => value.clone(),
                Value::Text(s) => Value::Blob(s.as_bytes().to_vec()),
                other => Value::Blob(other.to_string().into_bytes()),
            },
        }
    }

    /// Parse a command-line literal into a value of this type.
    ///
    /// The literal `null` is NULL for every type.
    pub fn parse_value(self, raw: &str) -> Result<Value> {
        if raw == "null" {
            return Ok(Value::Null);
        }

        match self {
            ColumnType::Null => Err(GatewayError::InvalidArgument(format!(
                "Column of type null only accepts 'null', got '{}'",
                raw
            ))),
            ColumnType::Integer => raw.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
                GatewayError::InvalidArgument(format!("'{}' is not an integer", raw))
            }),
            ColumnType::Float => raw.trim().parse::<f64>().map(Value::Real).map_err(|_| {
                GatewayError::InvalidArgument(format!("'{}' is not a number", raw))
            }),
            ColumnType::Boolean => match raw.to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(GatewayError::InvalidArgument(format!(
                    "'{}' is not a boolean",
                    raw
                ))),
            },
            ColumnType::String => Ok(Value::Text(raw.to_string())),
            ColumnType::Blob => Ok(Value::Blob(raw.as_bytes().to_vec())),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "null" => Ok(ColumnType::Null),
            "integer" | "int" | "bigint" => Ok(ColumnType::Integer),
            "float" | "real" | "double" => Ok(ColumnType::Float),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "string" | "str" | "text" | "varchar" => Ok(ColumnType::String),
            "blob" | "lob" | "binary" => Ok(ColumnType::Blob),
            _ => Err(GatewayError::Config(format!("Unknown column type: {}", s))),
        }
    }
}
