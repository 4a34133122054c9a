//! Migration trait definition

use crate::executor::{DbError, ShiftExecutor};
use crate::migration::MigrationError;
use std::fmt;

/// A one-shot schema change
///
/// The id must be unique within a registry and must never change once the
/// migration has been applied anywhere: the database remembers its position
/// by id, so renaming an applied migration breaks position lookup.
///
/// `QueryMigration` covers the single-statement case. Anything more involved
/// (several statements, conditional steps, data backfills) implements this
/// trait directly.
///
/// ```rust
/// use schemashift::{DbError, Migration, ShiftExecutor};
///
/// struct SplitName;
///
/// impl Migration for SplitName {
///     fn id(&self) -> &str {
///         "003_split_name"
///     }
///
///     fn apply(&self, executor: &dyn ShiftExecutor) -> Result<(), DbError> {
///         executor.execute("ALTER TABLE users ADD COLUMN first_name TEXT", &[])?;
///         executor.execute("ALTER TABLE users ADD COLUMN last_name TEXT", &[])?;
///         executor.execute("UPDATE users SET first_name = split_part(name, ' ', 1)", &[])?;
///         Ok(())
///     }
/// }
/// ```
pub trait Migration: Send + Sync {
    /// The unique, stable id of this migration
    fn id(&self) -> &str;

    /// Apply this migration
    ///
    /// Synchronous: `may_postgres` schedules coroutines internally.
    ///
    /// # Errors
    ///
    /// Returns the `DbError` of the first statement that fails.
    fn apply(&self, executor: &dyn ShiftExecutor) -> Result<(), DbError>;
}

impl fmt::Debug for dyn Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration").field("id", &self.id()).finish()
    }
}

/// A migration that executes one literal SQL string verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMigration {
    id: String,
    sql: String,
}

impl QueryMigration {
    /// Create a migration from an id and a SQL string
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::InvalidArgument` if either argument is blank.
    pub fn new(id: impl Into<String>, sql: impl Into<String>) -> Result<Self, MigrationError> {
        let id = id.into();
        let sql = sql.into();

        if id.trim().is_empty() {
            return Err(MigrationError::InvalidArgument("id may not be empty".to_string()));
        }
        if sql.trim().is_empty() {
            return Err(MigrationError::InvalidArgument(format!(
                "query for migration '{id}' may not be empty"
            )));
        }

        Ok(Self { id, sql })
    }

    /// The SQL executed by [`Migration::apply`]
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl Migration for QueryMigration {
    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&self, executor: &dyn ShiftExecutor) -> Result<(), DbError> {
        executor.execute(&self.sql, &[])?;
        Ok(())
    }
}

/// Boxed [`QueryMigration`], ready for [`MigrationRegistry::register`](crate::migration::MigrationRegistry::register)
///
/// # Errors
///
/// Returns `MigrationError::InvalidArgument` if either argument is blank.
pub fn from_query(
    id: impl Into<String>,
    sql: impl Into<String>,
) -> Result<Box<dyn Migration>, MigrationError> {
    Ok(Box::new(QueryMigration::new(id, sql)?))
}
