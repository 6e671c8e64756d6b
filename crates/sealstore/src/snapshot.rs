// crates/sealstore/src/snapshot.rs
// ============================================================================
// Module: Schema Snapshot
// Description: Structural capture of a store's tables, columns and indexes.
// Purpose: Compare upgraded and freshly bootstrapped stores; report shape.
// Dependencies: rusqlite, serde
// ============================================================================

//! ## Overview
//! A snapshot holds two views of a store:
//! - the structure reported by the engine's table and index introspection,
//!   with tables and indexes sorted by name and columns in declaration order
//!   (internal `sqlite_%` objects and automatic indexes are skipped);
//! - every row of `sqlite_master` with its stored `CREATE` text, including
//!   automatic indexes and `sqlite_sequence`.
//!
//! `ALTER TABLE ... ADD COLUMN` rewrites the stored text, so a store that
//! reached a shape through alters carries the same statements as one created
//! in that shape when the declarations match. Table constraints such as
//! `UNIQUE`, `ON CONFLICT`, `CHECK`, and `AUTOINCREMENT` are only visible in
//! the statement view.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use rusqlite::params;
use serde::Serialize;

use crate::error::StoreError;
use crate::version::SchemaVersion;
use crate::version::read_version_stamp;

// ============================================================================
// SECTION: Snapshot Types
// ============================================================================

/// One column as reported by `pragma_table_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSnapshot {
    /// Column name.
    pub name: String,
    /// Declared type, upper-cased.
    pub declared_type: String,
    /// Whether the column is `NOT NULL`.
    pub not_null: bool,
    /// Default value expression, if any.
    pub default_value: Option<String>,
    /// 1-based position in the primary key, or 0.
    pub primary_key: i64,
}

/// One table and its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnSnapshot>,
}

/// One index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSnapshot {
    /// Index name.
    pub name: String,
    /// Indexed table.
    pub table: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Indexed columns in key order.
    pub columns: Vec<String>,
}

/// One row of `sqlite_master`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementSnapshot {
    /// Object type (`table`, `index`, `trigger`, `view`).
    pub kind: String,
    /// Object name.
    pub name: String,
    /// Owning table.
    pub table: String,
    /// Stored `CREATE` text; absent for automatic indexes.
    pub sql: Option<String>,
}

/// Structural view of a whole store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSnapshot {
    /// Stored version stamp.
    pub version: SchemaVersion,
    /// Tables sorted by name.
    pub tables: Vec<TableSnapshot>,
    /// Explicitly created indexes sorted by name.
    pub indexes: Vec<IndexSnapshot>,
    /// Stored schema statements sorted by type, then name.
    pub statements: Vec<StatementSnapshot>,
}

impl SchemaSnapshot {
    /// Captures the current shape of the store behind `connection`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when an introspection query fails.
    pub fn capture(connection: &Connection) -> Result<Self, StoreError> {
        let version = read_version_stamp(connection)?;
        let mut tables = Vec::new();
        for name in object_names(connection, "table")? {
            let columns = table_columns(connection, &name)?;
            tables.push(TableSnapshot {
                name,
                columns,
            });
        }
        let mut indexes = Vec::new();
        for (name, table) in index_names(connection)? {
            let (unique, columns) = index_detail(connection, &table, &name)?;
            indexes.push(IndexSnapshot {
                name,
                table,
                unique,
                columns,
            });
        }
        let statements = stored_statements(connection)?;
        Ok(Self {
            version,
            tables,
            indexes,
            statements,
        })
    }

    /// Returns the table named `name`.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Returns the table names in order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|table| table.name.as_str())
    }
}

// ============================================================================
// SECTION: Introspection
// ============================================================================

/// Lists user objects of `kind`, sorted by name.
fn object_names(connection: &Connection, kind: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt = connection
        .prepare(
            "SELECT name FROM sqlite_master WHERE type = ?1 AND name NOT LIKE 'sqlite_%' ORDER BY \
             name",
        )
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let rows = stmt
        .query_map(params![kind], |row| row.get::<_, String>(0))
        .map_err(|err| StoreError::from_sqlite(&err))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|err| StoreError::from_sqlite(&err))
}

/// Lists explicitly created indexes with their tables, sorted by name.
fn index_names(connection: &Connection) -> Result<Vec<(String, String)>, StoreError> {
    let mut stmt = connection
        .prepare(
            "SELECT name, tbl_name FROM sqlite_master WHERE type = 'index' AND sql IS NOT NULL \
             ORDER BY name",
        )
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|err| StoreError::from_sqlite(&err))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|err| StoreError::from_sqlite(&err))
}

/// Reads every `sqlite_master` row.
fn stored_statements(connection: &Connection) -> Result<Vec<StatementSnapshot>, StoreError> {
    let mut stmt = connection
        .prepare("SELECT type, name, tbl_name, sql FROM sqlite_master ORDER BY type, name")
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StatementSnapshot {
                kind: row.get(0)?,
                name: row.get(1)?,
                table: row.get(2)?,
                sql: row.get(3)?,
            })
        })
        .map_err(|err| StoreError::from_sqlite(&err))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|err| StoreError::from_sqlite(&err))
}

/// Reads the columns of `table`.
fn table_columns(connection: &Connection, table: &str) -> Result<Vec<ColumnSnapshot>, StoreError> {
    let mut stmt = connection
        .prepare("SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid")
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let rows = stmt
        .query_map(params![table], |row| {
            Ok(ColumnSnapshot {
                name: row.get(0)?,
                declared_type: row.get::<_, String>(1)?.to_ascii_uppercase(),
                not_null: row.get::<_, i64>(2)? != 0,
                default_value: row.get(3)?,
                primary_key: row.get(4)?,
            })
        })
        .map_err(|err| StoreError::from_sqlite(&err))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|err| StoreError::from_sqlite(&err))
}

/// Reads the uniqueness flag and key columns of index `name` on `table`.
fn index_detail(
    connection: &Connection,
    table: &str,
    name: &str,
) -> Result<(bool, Vec<String>), StoreError> {
    let unique = connection
        .query_row(
            "SELECT \"unique\" FROM pragma_index_list(?1) WHERE name = ?2",
            params![table, name],
            |row| row.get::<_, i64>(0),
        )
        .map_err(|err| StoreError::from_sqlite(&err))?
        != 0;
    let mut stmt = connection
        .prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let rows = stmt
        .query_map(params![name], |row| row.get::<_, Option<String>>(0))
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let mut columns = Vec::new();
    for column in rows {
        let column = column.map_err(|err| StoreError::from_sqlite(&err))?;
        columns.push(column.unwrap_or_else(|| "<expression>".to_string()));
    }
    Ok((unique, columns))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
