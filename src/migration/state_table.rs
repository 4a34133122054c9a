//! Tracking table management
//!
//! The database records its own position in a single-row table:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS "schemashift_meta" (
//!     version SMALLINT NOT NULL PRIMARY KEY DEFAULT 1 CHECK (version = 1),
//!     last_migration_id TEXT NULL
//! )
//! ```
//!
//! `version` pins the table format and doubles as the fixed primary key, so
//! the upsert can never produce a second row.

use crate::executor::{DbError, ShiftExecutor};
use crate::migration::MigrationError;
use crate::value::SqlValue;
use regex::Regex;

/// Default tracking table name
pub const DEFAULT_TRACKING_TABLE: &str = "schemashift_meta";

/// Format version written into the `version` column
pub const TRACKING_FORMAT_VERSION: i64 = 1;

// PostgreSQL truncates identifiers past 63 bytes (NAMEDATALEN - 1).
const TABLE_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]{0,62}$";

const TABLE_EXISTS_SQL: &str = "SELECT COUNT(*) FROM information_schema.tables \
     WHERE table_schema = current_schema() AND table_name = $1::text";

/// The tracking table of one migration set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingTable {
    name: String,
}

impl TrackingTable {
    /// Tracking table with a custom name
    ///
    /// Useful when several applications share one database.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::InvalidTableName` unless `name` is a plain
    /// identifier; the name is interpolated into SQL.
    pub fn new(name: impl Into<String>) -> Result<Self, MigrationError> {
        let name = name.into();
        let re = Regex::new(TABLE_NAME_PATTERN)
            .map_err(|e| MigrationError::InvalidArgument(format!("Invalid regex: {e}")))?;
        if !re.is_match(&name) {
            return Err(MigrationError::InvalidTableName(name));
        }
        Ok(Self { name })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn quoted(&self) -> String {
        format!("\"{}\"", self.name)
    }

    /// Whether the table exists in the current schema
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the catalog query fails.
    pub fn exists(&self, executor: &dyn ShiftExecutor) -> Result<bool, DbError> {
        let count = executor.query_scalar(TABLE_EXISTS_SQL, &[SqlValue::from(self.name.as_str())])?;
        Ok(count.and_then(|v| v.as_i64()).unwrap_or(0) != 0)
    }

    /// The persisted `last_migration_id`
    ///
    /// `None` when the table is missing, has no row, or the column is null.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if either query fails.
    pub fn read_position(&self, executor: &dyn ShiftExecutor) -> Result<Option<String>, DbError> {
        if !self.exists(executor)? {
            return Ok(None);
        }

        let sql = format!("SELECT last_migration_id FROM {}", self.quoted());
        let value = executor.query_scalar(&sql, &[])?;
        Ok(value.and_then(SqlValue::into_text))
    }

    /// Create the table if it is missing
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the DDL fails.
    pub fn ensure_created(&self, executor: &dyn ShiftExecutor) -> Result<(), DbError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             version SMALLINT NOT NULL PRIMARY KEY DEFAULT {v} CHECK (version = {v}), \
             last_migration_id TEXT NULL)",
            self.quoted(),
            v = TRACKING_FORMAT_VERSION
        );
        executor.execute(&sql, &[])?;
        Ok(())
    }

    /// Record `id` as the last applied migration
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the upsert fails.
    pub fn write_position(&self, executor: &dyn ShiftExecutor, id: &str) -> Result<(), DbError> {
        let sql = format!(
            "INSERT INTO {} (version, last_migration_id) VALUES ({}, $1) \
             ON CONFLICT (version) DO UPDATE SET last_migration_id = EXCLUDED.last_migration_id",
            self.quoted(),
            TRACKING_FORMAT_VERSION
        );
        executor.execute(&sql, &[SqlValue::from(id)])?;
        Ok(())
    }
}

impl Default for TrackingTable {
    fn default() -> Self {
        Self {
            name: DEFAULT_TRACKING_TABLE.to_string(),
        }
    }
}
