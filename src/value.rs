//! Domain values exchanged between entities and stored rows
//!
//! A [`Value`] is the unit the mapper moves in both directions: entities hand
//! values out for SQL generation, and fetched cells come back as values to be
//! applied onto a default-constructed entity.

use rusqlite::types::ValueRef;

use crate::{Error, Result};

/// A single cell value in either direction of the mapping
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Storage-class name of this value, used in conversion errors
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert into an integer, accepting the textual form SQLite hands back
    /// for cells written through quoted literals.
    pub fn into_i64(self) -> Result<i64> {
        match self {
            Value::Integer(n) => Ok(n),
            Value::Text(ref s) => s.parse().map_err(|_| self.conversion_error("integer")),
            other => Err(other.conversion_error("integer")),
        }
    }

    pub fn into_f64(self) -> Result<f64> {
        match self {
            Value::Real(n) => Ok(n),
            Value::Integer(n) => Ok(n as f64),
            Value::Text(ref s) => s.parse().map_err(|_| self.conversion_error("real")),
            other => Err(other.conversion_error("real")),
        }
    }

    pub fn into_string(self) -> Result<String> {
        match self {
            Value::Text(s) => Ok(s),
            Value::Integer(n) => Ok(n.to_string()),
            Value::Real(n) => Ok(n.to_string()),
            other => Err(other.conversion_error("text")),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Value::Blob(b) => Ok(b),
            other => Err(other.conversion_error("blob")),
        }
    }

    fn conversion_error(&self, to: &'static str) -> Error {
        Error::Conversion {
            from: self.kind(),
            to,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Real(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Value::from(v),
            None => Value::Null,
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(cell: ValueRef<'_>) -> Self {
        match cell {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::Integer(n),
            ValueRef::Real(n) => Value::Real(n),
            ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_from_text_cell() {
        // Cells written through quoted literals come back as text
        assert_eq!(Value::Text("42".into()).into_i64().unwrap(), 42);
        assert_eq!(Value::Integer(42).into_i64().unwrap(), 42);
    }

    #[test]
    fn test_real_widening() {
        assert_eq!(Value::Integer(3).into_f64().unwrap(), 3.0);
        assert_eq!(Value::Text("1.5".into()).into_f64().unwrap(), 1.5);
    }

    #[test]
    fn test_conversion_failure_is_typed() {
        let err = Value::Blob(vec![1, 2]).into_i64().unwrap_err();
        match err {
            Error::Conversion { from, to } => {
                assert_eq!(from, "blob");
                assert_eq!(to, "integer");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_option_maps_to_null() {
        let none: Option<i64> = None;
        assert_eq!(Value::from(none), Value::Null);
        assert_eq!(Value::from(Some(7i64)), Value::Integer(7));
    }
}
