//! Scalar values and associative records.
//!
//! A [`Record`] is an ordered mapping from column name to [`Value`]. Column
//! order is insertion order, which is also the order columns appear in
//! generated SQL.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

/// A single column value as returned by, or bound to, the database.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,

    /// 64-bit signed integer.
    Integer(i64),

    /// 64-bit floating point.
    Real(f64),

    /// Boolean value.
    Bool(bool),

    /// Text data.
    Text(String),

    /// Binary data.
    Blob(Vec<u8>),
}

/// Ordered column name → value mapping.
pub type Record = IndexMap<String, Value>;

/// Column = value predicates, joined with AND.
pub type Criteria = IndexMap<String, Value>;

/// Build a [`Record`] (or [`Criteria`]) from `(column, value)` pairs.
///
/// ```rust
/// use table_gateway::{record, Value};
///
/// let r = record([("name", Value::from("alice")), ("age", Value::from(30))]);
/// assert_eq!(r.get_index(0).map(|(k, _)| k.as_str()), Some("name"));
/// ```
pub fn record<K, V, I>(pairs: I) -> Record
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl Value {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The integer payload, if this is an `Integer`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// The boolean payload, if this is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The text payload, if this is `Text`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the variant, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Bool(_) => "boolean",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }

    /// Native integer cast. NULL stays NULL.
    ///
    /// Text is parsed as a decimal integer, then as a float (truncated);
    /// anything unparseable becomes 0.
    #[must_use]
    pub fn to_integer(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Integer(v) => Value::Integer(*v),
            Value::Real(v) => Value::Integer(*v as i64),
            Value::Bool(v) => Value::Integer(i64::from(*v)),
            Value::Text(s) => Value::Integer(parse_integer(s)),
            Value::Blob(b) => Value::Integer(parse_integer(&String::from_utf8_lossy(b))),
        }
    }

    /// Native boolean cast. NULL stays NULL.
    ///
    /// Zero, the empty string and `"0"` are false; everything else is true.
    #[must_use]
    pub fn to_boolean(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Bool(v) => Value::Bool(*v),
            Value::Integer(v) => Value::Bool(*v != 0),
            Value::Real(v) => Value::Bool(*v != 0.0),
            Value::Text(s) => Value::Bool(!(s.is_empty() || s == "0")),
            Value::Blob(b) => Value::Bool(!(b.is_empty() || b.as_slice() == b"0")),
        }
    }
}

fn parse_integer(s: &str) -> i64 {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return v;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v as i64,
        _ => 0,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
            Value::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(v) => serializer.serialize_i64(*v),
            Value::Real(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Text(v) => serializer.serialize_str(v),
            Value::Blob(v) => v.serialize(serializer),
        }
    }
}

// From implementations for common types
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
