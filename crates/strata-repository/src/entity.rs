//! Table mapping for persistent entities.

use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::FromRow;
use strata_core::{Entity, SqlValue, StrataError, StrataResult};
use uuid::Uuid;

/// An [`Entity`] stored as one row of one table.
///
/// The mapping is declared once per type through associated constants; the
/// DAO reads it when it is constructed and renders its SQL from it.
///
/// ```ignore
/// impl TableEntity for Customer {
///     const TABLE: &'static str = "customers";
///     const COLUMNS: &'static [&'static str] = &["name", "email"];
///     type Row = CustomerRow;
///
///     fn values(&self) -> Vec<SqlValue> {
///         vec![self.name.clone().into(), self.email.clone().into()]
///     }
///
///     fn from_row(row: CustomerRow) -> StrataResult<Self> { ... }
/// }
/// ```
pub trait TableEntity: Entity + Send + Sync + Unpin + Sized + 'static {
    /// Table name.
    const TABLE: &'static str;

    /// Primary key column.
    const ID_COLUMN: &'static str = "id";

    /// Non-key columns, in the order [`TableEntity::values`] returns them.
    const COLUMNS: &'static [&'static str];

    /// Raw row type decoded by SQLx. Its fields are the id column followed by
    /// `COLUMNS`.
    type Row: for<'r> FromRow<'r, AnyRow> + Send + Unpin;

    /// Column values, in `COLUMNS` order. The id is not included.
    fn values(&self) -> Vec<SqlValue>;

    /// Builds the entity from a decoded row.
    fn from_row(row: Self::Row) -> StrataResult<Self>;
}

/// Parses a UUID stored as text.
pub fn parse_uuid(column: &str, value: &str) -> StrataResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| StrataError::Internal(format!("Invalid UUID in column {}: {}", column, e)))
}

/// Parses an RFC 3339 timestamp stored as text.
pub fn parse_timestamp(column: &str, value: &str) -> StrataResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StrataError::Internal(format!("Invalid timestamp in column {}: {}", column, e)))
}
