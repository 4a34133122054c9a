//! Values crossing the [`ShiftExecutor`](crate::ShiftExecutor) boundary
//!
//! The executor seam deals in a deliberately small value type so that
//! migrations, the tracking table and test doubles can all talk to a
//! connection without depending on a driver's row representation.

use std::fmt;

/// A single SQL parameter or result column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// SQL `NULL`
    Null,
    /// Any character type (`TEXT`, `VARCHAR`, `CHAR`, `NAME`)
    Text(String),
    /// Any integer type, widened to 64 bits
    BigInt(i64),
    /// `BOOLEAN`
    Bool(bool),
}

impl SqlValue {
    /// Returns `true` for [`SqlValue::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Borrow the text payload, or `None` for any other variant
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, or `None` for any other variant
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::BigInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Consume the value, keeping only text
    ///
    /// `NULL` and non-text values map to `None`.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Text(s) => write!(f, "'{s}'"),
            SqlValue::BigInt(n) => write!(f, "{n}"),
            SqlValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::BigInt(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::BigInt(i64::from(value))
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// A result row: one [`SqlValue`] per selected column, in select order
pub type SqlRow = Vec<SqlValue>;
