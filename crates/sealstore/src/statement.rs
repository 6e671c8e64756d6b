// crates/sealstore/src/statement.rs
// ============================================================================
// Module: Statement Batches
// Description: Ordered lists of raw schema/data statements.
// Purpose: Let table owners hand opaque SQL to the bootstrapper and ledger.
// Dependencies: rusqlite, tracing
// ============================================================================

//! ## Overview
//! A [`StatementBatch`] is a passive, ordered list of SQL statements. It has
//! no state of its own; executing it runs each statement in order on the
//! supplied connection and stops at the first failure. Transaction scope is
//! always the caller's.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;

use rusqlite::Connection;
use tracing::debug;

use crate::error::StoreError;

// ============================================================================
// SECTION: Statement Batch
// ============================================================================

/// Ordered sequence of SQL statements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatementBatch {
    /// Statements in execution order.
    statements: Vec<Cow<'static, str>>,
}

impl StatementBatch {
    /// Returns an empty batch.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    /// Builds a batch from static statement text.
    #[must_use]
    pub fn from_static(statements: &[&'static str]) -> Self {
        Self {
            statements: statements.iter().map(|statement| Cow::Borrowed(*statement)).collect(),
        }
    }

    /// Appends a statement.
    #[must_use]
    pub fn with(mut self, statement: impl Into<Cow<'static, str>>) -> Self {
        self.statements.push(statement.into());
        self
    }

    /// Appends every statement of `other`.
    #[must_use]
    pub fn extended(mut self, other: &Self) -> Self {
        self.statements.extend(other.statements.iter().cloned());
        self
    }

    /// Returns the statements in execution order.
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(AsRef::as_ref)
    }

    /// Returns the number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true when the batch holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Runs every statement in order on `connection`.
    ///
    /// # Errors
    ///
    /// Returns the classified engine error of the first failing statement.
    pub fn execute(&self, connection: &Connection) -> Result<(), StoreError> {
        for (index, statement) in self.statements.iter().enumerate() {
            debug!(statement = index + 1, total = self.statements.len(), "executing statement");
            connection.execute_batch(statement).map_err(|err| StoreError::from_sqlite(&err))?;
        }
        Ok(())
    }
}

impl From<&'static str> for StatementBatch {
    fn from(statement: &'static str) -> Self {
        Self::from_static(&[statement])
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::StatementBatch;

    #[test]
    fn executes_in_order_and_stops_at_first_failure() -> Result<(), String> {
        let connection = Connection::open_in_memory().map_err(|err| err.to_string())?;
        let batch = StatementBatch::from_static(&[
            "CREATE TABLE kv (key TEXT PRIMARY KEY, value TEXT)",
            "INSERT INTO kv (key, value) VALUES ('a', '1')",
            "INSERT INTO missing_table (key) VALUES ('b')",
            "INSERT INTO kv (key, value) VALUES ('c', '3')",
        ]);
        assert!(batch.execute(&connection).is_err());
        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .map_err(|err| err.to_string())?;
        assert_eq!(count, 1);
        Ok(())
    }

    #[test]
    fn builder_preserves_order() {
        let batch = StatementBatch::empty().with("SELECT 1").with(String::from("SELECT 2"));
        let extended = StatementBatch::from("SELECT 0").extended(&batch);
        assert_eq!(extended.statements().collect::<Vec<_>>(), ["SELECT 0", "SELECT 1", "SELECT 2"]);
        assert_eq!(extended.len(), 3);
        assert!(StatementBatch::empty().is_empty());
    }
}
