//! Connection establishment for `may_postgres`
//!
//! Validates the connection string up front so that obviously malformed
//! configuration fails before any network round trip.

use may_postgres::{Client, Error as PostgresError};

#[cfg(feature = "tracing")]
use tracing::debug_span;

/// Connection error type
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Invalid connection string format
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),
    /// Network/authentication error from `may_postgres`
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] PostgresError),
}

/// Establishes a connection to PostgreSQL using `may_postgres`
///
/// Supports the URI format (`postgresql://[user[:pass]@]host[:port]/dbname`) and the
/// key-value format (`host=localhost user=postgres dbname=mydb`).
///
/// This is a blocking call that also works inside coroutines.
///
/// # Errors
///
/// Returns `ConnectionError::InvalidConnectionString` for malformed input and
/// `ConnectionError::Postgres` if the server cannot be reached or rejects us.
pub fn connect(connection_string: &str) -> Result<Client, ConnectionError> {
    #[cfg(feature = "tracing")]
    let _span = debug_span!("schemashift.connect").entered();

    validate_connection_string(connection_string)?;

    let client = may_postgres::connect(connection_string)?;
    log::debug!("Connected to PostgreSQL");
    Ok(client)
}

/// Validates a connection string format
///
/// # Errors
///
/// Returns `ConnectionError::InvalidConnectionString` describing the problem.
pub fn validate_connection_string(connection_string: &str) -> Result<(), ConnectionError> {
    if connection_string.trim().is_empty() {
        return Err(ConnectionError::InvalidConnectionString(
            "Connection string cannot be empty".to_string(),
        ));
    }

    let is_uri_format = connection_string.starts_with("postgresql://")
        || connection_string.starts_with("postgres://");
    let is_key_value_format = !is_uri_format && connection_string.contains('=');

    if !is_uri_format && !is_key_value_format {
        return Err(ConnectionError::InvalidConnectionString(
            "Connection string must be in URI format (postgresql://...) or key-value format (host=...)".to_string(),
        ));
    }

    Ok(())
}
