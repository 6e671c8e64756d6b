// crates/sealstore/tests/common/mod.rs
// ============================================================================
// Module: Sealstore Test Helpers
// Description: Shared store fixtures for sealstore integration suites.
// Purpose: Build temp stores, secrets, and synthetic ledgers.
// Dependencies: sealstore, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Helpers shared by the integration suites. Every store lives in its own
//! [`TempDir`] so suites can run in parallel.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::PathBuf;

use rusqlite::Connection;
use rusqlite::params;
use sealstore::CustomAction;
use sealstore::MigrationLedger;
use sealstore::MigrationStep;
use sealstore::SchemaDefinition;
use sealstore::StatementBatch;
use sealstore::StoreConfig;
use sealstore::StoreError;
use sealstore::StoreSecret;
use tempfile::TempDir;

// ============================================================================
// SECTION: Stores
// ============================================================================

/// Secret used by most suites.
pub const SECRET_HEX: &str = "8f3a11c2d4e5f60718293a4b5c6d7e8f";

/// Returns the shared test secret.
pub fn secret() -> StoreSecret {
    StoreSecret::from_hex(SECRET_HEX).expect("test secret")
}

/// Returns a different, valid secret.
pub fn other_secret() -> StoreSecret {
    StoreSecret::from_hex("00112233445566778899aabbccddeeff").expect("other secret")
}

/// Returns a store path inside `temp`.
pub fn store_path(temp: &TempDir) -> PathBuf {
    temp.path().join("store").join("messenger.db")
}

/// Returns a default config for a store inside `temp`.
pub fn store_config(temp: &TempDir) -> StoreConfig {
    StoreConfig::new(store_path(temp))
}

// ============================================================================
// SECTION: Synthetic Schemas
// ============================================================================

/// Single-table schema used by synthetic lifecycles.
pub fn journal_schema() -> SchemaDefinition {
    SchemaDefinition::new().indexed_table(
        "journal",
        "CREATE TABLE journal (_id INTEGER PRIMARY KEY, entry TEXT)",
        "CREATE INDEX journal_entry_index ON journal (entry)",
    )
}

/// Step that creates table `marker_<threshold>`.
pub fn marker_step(threshold: u32) -> MigrationStep {
    MigrationStep::new(threshold, format!("create marker {threshold}")).then(
        StatementBatch::empty()
            .with(format!("CREATE TABLE marker_{threshold} (_id INTEGER PRIMARY KEY)")),
    )
}

/// Step whose custom action always fails.
pub fn failing_step(threshold: u32) -> MigrationStep {
    MigrationStep::new(threshold, "always fails").then(CustomAction::new("fail", |_| {
        Err(StoreError::Invalid("synthetic failure".to_string()))
    }))
}

/// Ledger of marker steps at `thresholds`.
pub fn marker_ledger(thresholds: &[u32]) -> MigrationLedger {
    MigrationLedger::new(thresholds.iter().copied().map(marker_step).collect())
        .expect("marker ledger")
}

/// Returns the names of tables starting with `marker_`.
pub fn marker_tables(connection: &Connection) -> Vec<String> {
    let mut stmt = connection
        .prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND substr(name, 1, 7) = \
             'marker_' ORDER BY name",
        )
        .expect("prepare marker query");
    stmt.query_map([], |row| row.get::<_, String>(0))
        .expect("query markers")
        .collect::<Result<Vec<_>, _>>()
        .expect("collect markers")
}

// ============================================================================
// SECTION: Work Items
// ============================================================================

/// Creates the job tables on a plain connection.
pub fn create_job_tables(connection: &Connection) {
    connection
        .execute_batch(
            "CREATE TABLE job_spec (_id INTEGER PRIMARY KEY AUTOINCREMENT, job_spec_id TEXT \
             UNIQUE, factory_key TEXT);
             CREATE TABLE constraint_spec (_id INTEGER PRIMARY KEY AUTOINCREMENT, job_spec_id \
             TEXT, factory_key TEXT);",
        )
        .expect("create job tables");
}

/// Inserts one job and one constraint row of `kind`.
pub fn insert_work_item(connection: &Connection, job_id: &str, kind: &str) {
    connection
        .execute(
            "INSERT INTO job_spec (job_spec_id, factory_key) VALUES (?1, ?2)",
            params![job_id, kind],
        )
        .expect("insert job");
    connection
        .execute(
            "INSERT INTO constraint_spec (job_spec_id, factory_key) VALUES (?1, ?2)",
            params![job_id, kind],
        )
        .expect("insert constraint");
}

/// Counts rows of `kind` in `table`.
pub fn count_kind(connection: &Connection, table: &str, kind: &str) -> i64 {
    connection
        .query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE factory_key = ?1"),
            params![kind],
            |row| row.get(0),
        )
        .expect("count rows")
}
