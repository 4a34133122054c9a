//! Migration-specific error types

use crate::executor::DbError;
use std::path::PathBuf;

/// Migration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// A statement failed; the underlying database error is passed through untouched
    #[error(transparent)]
    Database(#[from] DbError),

    /// A migration with the same id is already registered
    #[error("A migration with the id '{0}' is already registered")]
    DuplicateId(String),

    /// A required argument was empty
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The tracking table name is not a plain SQL identifier
    #[error("Invalid tracking table name '{0}': expected [A-Za-z_][A-Za-z0-9_]*, at most 63 characters")]
    InvalidTableName(String),

    /// Strict mode only: the persisted position names a migration the registry does not know
    #[error(
        "Database is positioned at migration '{0}', which is not registered.\n\
         Migrations may have been renamed or removed after being applied."
    )]
    UnknownPosition(String),

    /// A migration source could not be read
    #[error("Failed to read migration source {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration source is not valid in the requested encoding
    #[error("Migration source {} is not valid {encoding}", .path.display())]
    Decode { path: PathBuf, encoding: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_is_transparent() {
        let inner = DbError::Query("syntax error at or near \"CREAT\"".to_string());
        let expected = inner.to_string();
        let err = MigrationError::from(inner);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_duplicate_id_display() {
        let err = MigrationError::DuplicateId("001_users".to_string());
        assert_eq!(
            err.to_string(),
            "A migration with the id '001_users' is already registered"
        );
    }

    #[test]
    fn test_unknown_position_mentions_id() {
        let err = MigrationError::UnknownPosition("old_id".to_string());
        assert!(err.to_string().contains("'old_id'"));
    }
}
