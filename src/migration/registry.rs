//! Ordered, de-duplicated migration registry

use crate::migration::{Migration, MigrationError};
use std::collections::HashSet;

/// The ordered set of migrations known to a [`Migrator`](crate::migration::Migrator)
///
/// Registration order is the execution order. Registering a migration that
/// logically belongs *before* one already applied to a database means it will
/// never run there, so append new migrations at the end.
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    migrations: Vec<Box<dyn Migration>>,
    ids: HashSet<String>,
}

impl MigrationRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a migration
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::DuplicateId` if a migration with the same id is
    /// already registered. The registry is left unchanged in that case.
    pub fn register(&mut self, migration: Box<dyn Migration>) -> Result<(), MigrationError> {
        let id = migration.id();
        if self.ids.contains(id) {
            return Err(MigrationError::DuplicateId(id.to_string()));
        }

        self.ids.insert(id.to_string());
        self.migrations.push(migration);
        Ok(())
    }

    /// Register each migration in order
    ///
    /// # Errors
    ///
    /// Stops at and returns the first `DuplicateId`. Migrations registered
    /// before the failure stay registered.
    pub fn register_all<I>(&mut self, migrations: I) -> Result<(), MigrationError>
    where
        I: IntoIterator<Item = Box<dyn Migration>>,
    {
        for migration in migrations {
            self.register(migration)?;
        }
        Ok(())
    }

    /// All migrations, in registration order
    #[must_use]
    pub fn all(&self) -> &[Box<dyn Migration>] {
        &self.migrations
    }

    /// The migrations registered strictly after `id`
    ///
    /// Returns `None` if no migration has that id, and an empty slice if `id`
    /// is the last registered migration.
    #[must_use]
    pub fn after(&self, id: &str) -> Option<&[Box<dyn Migration>]> {
        self.migrations
            .iter()
            .position(|m| m.id() == id)
            .map(|idx| &self.migrations[idx + 1..])
    }

    /// Same as [`after`](Self::after), keyed by a migration's id
    #[must_use]
    pub fn after_migration(&self, migration: &dyn Migration) -> Option<&[Box<dyn Migration>]> {
        self.after(migration.id())
    }

    /// Id of the most recently registered migration
    #[must_use]
    pub fn latest_id(&self) -> Option<&str> {
        self.migrations.last().map(|m| m.id())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Consume the registry, keeping registration order
    #[must_use]
    pub fn into_migrations(self) -> Vec<Box<dyn Migration>> {
        self.migrations
    }
}
