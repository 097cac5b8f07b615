pub mod comparison;
pub mod datatype;

use std::cmp::Ordering;
use std::fmt;

pub use comparison::ComparisonOperator;
pub use datatype::DataType;
use rivulet_error::{DbError, ErrorKind, Result};

/// A single typed literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Integer(_) => DataType::Integer,
            Self::Float(_) => DataType::Float,
            Self::Text(_) => DataType::Text,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this value may be stored in a field with the given declared
    /// type.
    ///
    /// Nulls are only assignable to nullable fields. No coercion happens
    /// between non-null types.
    pub fn is_assignable_to(&self, datatype: DataType, nullable: bool) -> bool {
        match self {
            Self::Null => nullable,
            other => other.datatype() == datatype,
        }
    }

    /// Compare two values of the same type.
    ///
    /// Returns `None` if either side is null. Comparing values of different
    /// non-null types is an error.
    pub fn compare(&self, other: &Value) -> Result<Option<Ordering>> {
        let ord = match (self, other) {
            (Self::Null, _) | (_, Self::Null) => return Ok(None),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.as_bytes().cmp(b.as_bytes()),
            (a, b) => {
                return Err(DbError::with_kind(
                    ErrorKind::FieldTypeMismatch,
                    "Cannot compare values of different types",
                )
                .with_field("left", a.datatype())
                .with_field("right", b.datatype()));
            }
        };
        Ok(Some(ord))
    }

    pub fn try_as_i64(&self) -> Result<i64> {
        match self {
            Self::Integer(v) => Ok(*v),
            other => Err(type_error(DataType::Integer, other)),
        }
    }

    pub fn try_as_f64(&self) -> Result<f64> {
        match self {
            Self::Float(v) => Ok(*v),
            other => Err(type_error(DataType::Float, other)),
        }
    }

    pub fn try_as_str(&self) -> Result<&str> {
        match self {
            Self::Text(v) => Ok(v),
            other => Err(type_error(DataType::Text, other)),
        }
    }
}

fn type_error(want: DataType, have: &Value) -> DbError {
    DbError::with_kind(ErrorKind::FieldTypeMismatch, "Unexpected value type")
        .with_field("want", want)
        .with_field("have", have.datatype())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}
