//! In-process migration execution helpers

use crate::config::ShiftConfig;
use crate::connection::{connect, ConnectionError};
use crate::executor::{MayPostgresExecutor, ShiftExecutor};
use crate::migration::{from_dir, MigrationError, MigrationRegistry, Migrator, TrackingTable};
use config::ConfigError;

/// Errors raised while migrating during application startup
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Run migrations on application startup
///
/// Connects to `config.url` and applies, in order, the files found in
/// `config.migrations_dir` (when set) followed by the migrations in
/// `registry`. Returns whether anything was applied. The application should
/// not continue if this fails.
///
/// # Example
///
/// ```rust,no_run
/// use schemashift::{from_query, MigrationRegistry, ShiftConfig};
/// use schemashift::migration::startup_migrations;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut registry = MigrationRegistry::new();
///     registry.register(from_query("001_users", "CREATE TABLE users (id BIGSERIAL PRIMARY KEY)")?)?;
///
///     startup_migrations(&ShiftConfig::load()?, registry)?;
///
///     // Continue with application startup...
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// Returns `StartupError::Connection` if the database is unreachable and
/// `StartupError::Migration` for loading, registration or run failures.
pub fn startup_migrations(config: &ShiftConfig, registry: MigrationRegistry) -> Result<bool, StartupError> {
    let executor = MayPostgresExecutor::new(connect(&config.url)?);
    Ok(migrate_with(config, registry, &executor)?)
}

/// [`startup_migrations`] against an existing executor
///
/// `config.url` is ignored.
///
/// # Errors
///
/// Returns the first loading, registration or run error.
pub fn migrate_with(
    config: &ShiftConfig,
    registry: MigrationRegistry,
    executor: &dyn ShiftExecutor,
) -> Result<bool, MigrationError> {
    let mut migrator = Migrator::from_parts(MigrationRegistry::new(), TrackingTable::new(&config.migrations_table)?)
        .strict_position(config.strict_position);

    if let Some(dir) = &config.migrations_dir {
        let loaded = from_dir(dir)?;
        log::debug!("Loaded {} migration file(s) from {}", loaded.len(), dir.display());
        migrator.register_all(loaded)?;
    }
    migrator.register_all(registry.into_migrations())?;

    let applied = migrator.migrate_latest(executor)?;
    if applied {
        log::info!("Startup migrations applied to {}", migrator.table().name());
    } else {
        log::debug!("No pending migrations to apply");
    }
    Ok(applied)
}
