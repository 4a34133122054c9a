//! Migration status reporting

/// Where a database stands relative to a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Persisted `last_migration_id`, `None` for a fresh database
    pub latest_completed: Option<String>,

    /// Ids `migrate_latest` would apply, in order
    pub pending: Vec<String>,

    /// The persisted id is not registered, so nothing will be applied
    pub diverged: bool,
}

impl MigrationStatus {
    #[must_use]
    pub fn new(latest_completed: Option<String>, pending: Vec<String>, diverged: bool) -> Self {
        Self {
            latest_completed,
            pending,
            diverged,
        }
    }

    /// Nothing to apply and the position is known
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty() && !self.diverged
    }

    /// The next migration that would run
    #[must_use]
    pub fn next_pending(&self) -> Option<&str> {
        self.pending.first().map(String::as_str)
    }
}
