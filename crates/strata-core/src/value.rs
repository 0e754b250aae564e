//! Driver-neutral column values.
//!
//! Entities hand their column values to the DAO layer as [`SqlValue`]s, which
//! keeps the mapping independent of the database the pool talks to. Only the
//! scalar kinds every supported backend can bind are represented; richer
//! types (UUIDs, timestamps) are stored as text.

use crate::TypedId;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::{self, Display};
use uuid::Uuid;

/// A single bindable column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,
    /// 64-bit integer.
    Int(i64),
    /// Double precision float.
    Float(f64),
    /// Text.
    Text(String),
    /// Binary data.
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Returns true for `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "'{}'", v),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T> From<TypedId<T>> for SqlValue {
    fn from(v: TypedId<T>) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Text(v.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Identifier types usable as a primary key.
pub trait SqlId: Clone + Display + Send + Sync + 'static {
    /// Converts the id to the value bound into `WHERE id = ?`.
    fn to_sql_value(&self) -> SqlValue;
}

impl SqlId for i64 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Int(*self)
    }
}

impl SqlId for String {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl SqlId for Uuid {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::from(*self)
    }
}

impl<T: 'static> SqlId for TypedId<T> {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::from(*self)
    }
}
