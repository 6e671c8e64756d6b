// crates/sealstore/tests/purge.rs
// ============================================================================
// Module: Stale Record Purge Tests
// Description: Two-table removal of retired work-item kinds.
// Purpose: Validate purge precision and its transaction requirement.
// ============================================================================

//! ## Overview
//! - Only listed kinds are removed, from both job tables.
//! - The purger refuses to run outside an open transaction.
//! - Historical purge steps report removed rows through the upgrade report.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use rusqlite::Connection;
use sealstore::PurgeSpec;
use sealstore::SchemaVersion;
use sealstore::StoreError;
use sealstore::catalog::RELEASE_BASELINE_VERSION;
use sealstore::catalog::messenger_ledger;
use sealstore::catalog::release_baseline_lifecycle;
use sealstore::purge;
use sealstore::upgrade;
use tempfile::TempDir;

mod common;
use crate::common::count_kind;
use crate::common::create_job_tables;
use crate::common::insert_work_item;
use crate::common::secret;
use crate::common::store_config;

// ============================================================================
// SECTION: Purger
// ============================================================================

fn seeded_connection() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    create_job_tables(&connection);
    insert_work_item(&connection, "job-a", "A");
    insert_work_item(&connection, "job-b1", "B");
    insert_work_item(&connection, "job-b2", "B");
    insert_work_item(&connection, "job-c", "C");
    connection
}

#[test]
fn purge_removes_only_listed_kinds_from_both_tables() {
    let mut connection = seeded_connection();
    let tx = connection.transaction().unwrap();
    let removed = purge(&tx, &PurgeSpec::new(["B"])).unwrap();
    tx.commit().unwrap();

    assert_eq!(removed, 4);
    for table in ["job_spec", "constraint_spec"] {
        assert_eq!(count_kind(&connection, table, "A"), 1);
        assert_eq!(count_kind(&connection, table, "B"), 0);
        assert_eq!(count_kind(&connection, table, "C"), 1);
    }
}

#[test]
fn purge_of_unknown_kind_removes_nothing() {
    let mut connection = seeded_connection();
    let tx = connection.transaction().unwrap();
    assert_eq!(purge(&tx, &PurgeSpec::new(["Z"])).unwrap(), 0);
    assert_eq!(purge(&tx, &PurgeSpec::default()).unwrap(), 0);
}

#[test]
fn purge_outside_transaction_is_rejected() {
    let connection = seeded_connection();
    let result = purge(&connection, &PurgeSpec::new(["B"]));
    assert!(matches!(result, Err(StoreError::Invalid(_))));
    assert_eq!(count_kind(&connection, "job_spec", "B"), 2);
}

#[test]
fn rolled_back_purge_keeps_rows() {
    let mut connection = seeded_connection();
    {
        let tx = connection.transaction().unwrap();
        assert_eq!(purge(&tx, &PurgeSpec::new(["A", "C"])).unwrap(), 4);
    }
    assert_eq!(count_kind(&connection, "job_spec", "A"), 1);
    assert_eq!(count_kind(&connection, "constraint_spec", "C"), 1);
}

// ============================================================================
// SECTION: Historical Purge Steps
// ============================================================================

#[test]
fn background_poll_jobs_are_purged_at_version_39() {
    let temp = TempDir::new().unwrap();
    let mut opened =
        release_baseline_lifecycle().unwrap().open(&store_config(&temp), &secret()).unwrap();
    let connection = opened.handle.connection();
    insert_work_item(connection, "poll-1", "BackgroundPollJob");
    insert_work_item(connection, "receipt-1", "SendReadReceiptJob");

    let report = upgrade(
        opened.handle.connection_mut(),
        &messenger_ledger().unwrap(),
        RELEASE_BASELINE_VERSION,
        SchemaVersion::new(39),
    )
    .unwrap();

    assert_eq!(report.rows_purged, 2);
    let connection = opened.handle.connection();
    assert_eq!(count_kind(connection, "job_spec", "BackgroundPollJob"), 0);
    assert_eq!(count_kind(connection, "constraint_spec", "BackgroundPollJob"), 0);
    assert_eq!(count_kind(connection, "job_spec", "SendReadReceiptJob"), 1);
    assert_eq!(count_kind(connection, "constraint_spec", "SendReadReceiptJob"), 1);
}
