//! In-memory `ShiftExecutor` for tests
//!
//! `MemoryExecutor` records every statement and understands just enough SQL
//! to stand in for a database during migration runs:
//!
//! - `CREATE TABLE [IF NOT EXISTS] name ...` registers a table (and fails on
//!   an existing table without `IF NOT EXISTS`, like a real server)
//! - the `information_schema.tables` existence check
//! - `SELECT last_migration_id FROM name`
//! - the tracking table upsert
//!
//! Anything else is recorded and reports zero affected rows.

use crate::executor::{DbError, ShiftExecutor};
use crate::value::{SqlRow, SqlValue};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

/// Recording executor with a writes counter and programmable failures
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    state: RefCell<State>,
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeSet<String>,
    positions: HashMap<String, Option<String>>,
    statements: Vec<String>,
    queries: usize,
    failures: Vec<String>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every `execute` whose SQL contains `pattern`
    pub fn fail_on(&self, pattern: &str) {
        self.state.borrow_mut().failures.push(pattern.to_string());
    }

    /// Forget all failure patterns
    pub fn clear_failures(&self) {
        self.state.borrow_mut().failures.clear();
    }

    /// Pretend a table already exists
    pub fn create_table(&self, name: &str) {
        self.state.borrow_mut().tables.insert(name.to_string());
    }

    /// Seed a tracking row without going through `execute`
    pub fn seed_position(&self, table: &str, last_migration_id: Option<&str>) {
        let mut state = self.state.borrow_mut();
        state.tables.insert(table.to_string());
        state
            .positions
            .insert(table.to_string(), last_migration_id.map(str::to_string));
    }

    /// `last_migration_id` of the tracking row, `None` if no row or null
    pub fn position(&self, table: &str) -> Option<String> {
        self.state.borrow().positions.get(table).cloned().flatten()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.state.borrow().tables.contains(name)
    }

    /// Every SQL string passed to `execute`, in order, including failed ones
    pub fn statements(&self) -> Vec<String> {
        self.state.borrow().statements.clone()
    }

    /// Number of `execute` calls
    pub fn writes(&self) -> usize {
        self.state.borrow().statements.len()
    }

    /// Number of `query` calls
    pub fn queries(&self) -> usize {
        self.state.borrow().queries
    }
}

impl ShiftExecutor for MemoryExecutor {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        let mut state = self.state.borrow_mut();
        state.statements.push(sql.to_string());

        if let Some(pattern) = state.failures.iter().find(|p| sql.contains(p.as_str())) {
            return Err(DbError::Query(format!("simulated failure matching '{pattern}'")));
        }

        let upper = sql.trim_start().to_ascii_uppercase();
        if upper.starts_with("CREATE TABLE") {
            let if_not_exists = upper.starts_with("CREATE TABLE IF NOT EXISTS");
            let keyword = if if_not_exists { "CREATE TABLE IF NOT EXISTS" } else { "CREATE TABLE" };
            let name = table_after(sql, keyword)?;
            if !state.tables.insert(name.clone()) && !if_not_exists {
                return Err(DbError::Query(format!("relation \"{name}\" already exists")));
            }
            return Ok(0);
        }

        if upper.starts_with("INSERT INTO") && sql.contains("last_migration_id") {
            let name = table_after(sql, "INSERT INTO")?;
            if !state.tables.contains(&name) {
                return Err(DbError::Query(format!("relation \"{name}\" does not exist")));
            }
            let id = params.first().cloned().and_then(SqlValue::into_text);
            state.positions.insert(name, id);
            return Ok(1);
        }

        Ok(0)
    }

    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>, DbError> {
        let mut state = self.state.borrow_mut();
        state.queries += 1;

        if sql.contains("information_schema.tables") {
            let name = params.first().and_then(SqlValue::as_text).unwrap_or_default();
            let count = i64::from(state.tables.contains(name));
            return Ok(vec![vec![SqlValue::BigInt(count)]]);
        }

        if sql.contains("SELECT last_migration_id FROM") {
            let name = table_after(sql, "FROM")?;
            if !state.tables.contains(&name) {
                return Err(DbError::Query(format!("relation \"{name}\" does not exist")));
            }
            return Ok(match state.positions.get(&name) {
                Some(id) => vec![vec![SqlValue::from(id.clone())]],
                None => Vec::new(),
            });
        }

        Ok(Vec::new())
    }
}

/// Table name following `keyword`, with quotes and a trailing `(` stripped
fn table_after(sql: &str, keyword: &str) -> Result<String, DbError> {
    let upper = sql.to_ascii_uppercase();
    let start = upper
        .find(keyword)
        .map(|idx| idx + keyword.len())
        .ok_or_else(|| DbError::Query(format!("expected {keyword} in: {sql}")))?;

    sql[start..]
        .split_whitespace()
        .next()
        .map(|token| token.split('(').next().unwrap_or_default())
        .map(|token| token.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| DbError::Query(format!("missing table name in: {sql}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_twice_fails_without_if_not_exists() {
        let executor = MemoryExecutor::new();
        executor.execute("CREATE TABLE users (id BIGINT)", &[]).unwrap();
        assert!(executor.has_table("users"));

        let err = executor.execute("CREATE TABLE users (id BIGINT)", &[]).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        executor
            .execute("CREATE TABLE IF NOT EXISTS \"users\" (id BIGINT)", &[])
            .unwrap();
        assert_eq!(executor.writes(), 3);
    }

    #[test]
    fn test_fail_on_matches_substring() {
        let executor = MemoryExecutor::new();
        executor.fail_on("DROP");
        assert!(executor.execute("DROP TABLE users", &[]).is_err());
        executor.clear_failures();
        assert!(executor.execute("DROP TABLE users", &[]).is_ok());
    }

    #[test]
    fn test_table_after_strips_quotes_and_parens() {
        assert_eq!(
            table_after("CREATE TABLE \"meta\"(version SMALLINT)", "CREATE TABLE").unwrap(),
            "meta"
        );
        assert_eq!(
            table_after("select last_migration_id from \"meta\"", "FROM").unwrap(),
            "meta"
        );
    }
}
