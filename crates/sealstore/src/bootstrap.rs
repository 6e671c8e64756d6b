// crates/sealstore/src/bootstrap.rs
// ============================================================================
// Module: Creation Bootstrapper
// Description: Builds the full current schema on a brand-new store.
// Purpose: Skip the historical ledger when no prior version exists.
// Dependencies: rusqlite, tracing
// ============================================================================

//! ## Overview
//! A [`SchemaDefinition`] lists the table owners of the application in
//! dependency order (referenced tables first). Each owner supplies a "create
//! table" batch and an optional "create index" batch. [`bootstrap`] runs all
//! table batches in owner order, then all index batches, and never consults
//! the migration ledger. The caller wraps it in the transaction that also
//! writes the version stamp, so an interrupted bootstrap leaves an unstamped
//! file that is safe to retry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use tracing::debug;

use crate::error::StoreError;
use crate::statement::StatementBatch;

// ============================================================================
// SECTION: Schema Definition
// ============================================================================

/// Schema statements contributed by one table owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOwner {
    /// Owner name, used for logging.
    name: &'static str,
    /// "Create table" statements.
    tables: StatementBatch,
    /// "Create index" statements.
    indexes: StatementBatch,
}

impl TableOwner {
    /// Creates an owner with table and index batches.
    #[must_use]
    pub const fn new(name: &'static str, tables: StatementBatch, indexes: StatementBatch) -> Self {
        Self {
            name,
            tables,
            indexes,
        }
    }

    /// Returns the owner name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the "create table" batch.
    #[must_use]
    pub const fn tables(&self) -> &StatementBatch {
        &self.tables
    }

    /// Returns the "create index" batch.
    #[must_use]
    pub const fn indexes(&self) -> &StatementBatch {
        &self.indexes
    }
}

/// Full current schema, ordered by reference dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaDefinition {
    /// Owners in creation order.
    owners: Vec<TableOwner>,
}

impl SchemaDefinition {
    /// Returns an empty definition.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            owners: Vec::new(),
        }
    }

    /// Appends an owner with tables only.
    #[must_use]
    pub fn table(self, name: &'static str, tables: impl Into<StatementBatch>) -> Self {
        self.owner(TableOwner::new(name, tables.into(), StatementBatch::empty()))
    }

    /// Appends an owner with tables and indexes.
    #[must_use]
    pub fn indexed_table(
        self,
        name: &'static str,
        tables: impl Into<StatementBatch>,
        indexes: impl Into<StatementBatch>,
    ) -> Self {
        self.owner(TableOwner::new(name, tables.into(), indexes.into()))
    }

    /// Appends an owner.
    #[must_use]
    pub fn owner(mut self, owner: TableOwner) -> Self {
        self.owners.push(owner);
        self
    }

    /// Returns the owners in creation order.
    #[must_use]
    pub fn owners(&self) -> &[TableOwner] {
        &self.owners
    }
}

// ============================================================================
// SECTION: Bootstrap
// ============================================================================

/// Creates every table, then every index, of `definition`.
///
/// # Errors
///
/// Returns the classified engine error of the first failing statement.
pub fn bootstrap(connection: &Connection, definition: &SchemaDefinition) -> Result<(), StoreError> {
    for owner in &definition.owners {
        debug!(owner = owner.name, statements = owner.tables.len(), "creating tables");
        owner.tables.execute(connection)?;
    }
    for owner in definition.owners.iter().filter(|owner| !owner.indexes.is_empty()) {
        debug!(owner = owner.name, statements = owner.indexes.len(), "creating indexes");
        owner.indexes.execute(connection)?;
    }
    Ok(())
}
