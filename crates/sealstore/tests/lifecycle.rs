// crates/sealstore/tests/lifecycle.rs
// ============================================================================
// Module: Store Lifecycle Tests
// Description: Bootstrap-or-upgrade selection on open.
// Purpose: Validate that exactly one schema path runs per open.
// ============================================================================

//! ## Overview
//! Drives synthetic lifecycles over encrypted temp stores:
//! - fresh files are bootstrapped without consulting the ledger
//! - stamped files are upgraded without re-running the bootstrap
//! - current and newer-than-build stores are left untouched

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

use sealstore::MigrationLedger;
use sealstore::OpenOutcome;
use sealstore::SchemaSnapshot;
use sealstore::SchemaVersion;
use sealstore::StoreError;
use sealstore::StoreHandle;
use sealstore::StoreLifecycle;
use sealstore::upgrade;
use tempfile::TempDir;

mod common;
use crate::common::failing_step;
use crate::common::journal_schema;
use crate::common::marker_ledger;
use crate::common::marker_step;
use crate::common::marker_tables;
use crate::common::secret;
use crate::common::store_config;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn lifecycle(ledger: MigrationLedger, version: u32) -> StoreLifecycle {
    StoreLifecycle::new(journal_schema(), ledger, SchemaVersion::new(version)).unwrap()
}

fn create_store_at(temp: &TempDir, version: u32) {
    let opened = lifecycle(MigrationLedger::default(), version)
        .open(&store_config(temp), &secret())
        .unwrap();
    assert_eq!(
        opened.outcome,
        OpenOutcome::Bootstrapped {
            version: SchemaVersion::new(version),
        }
    );
}

// ============================================================================
// SECTION: Construction
// ============================================================================

#[test]
fn lifecycle_rejects_zero_version() {
    let result = StoreLifecycle::new(journal_schema(), MigrationLedger::default(), SchemaVersion::UNSTAMPED);
    assert!(matches!(result, Err(StoreError::Invalid(_))));
}

#[test]
fn lifecycle_rejects_ledger_beyond_current_version() {
    let result =
        StoreLifecycle::new(journal_schema(), marker_ledger(&[2, 5]), SchemaVersion::new(4));
    assert!(matches!(result, Err(StoreError::Invalid(_))));
}

// ============================================================================
// SECTION: Bootstrap Versus Upgrade
// ============================================================================

#[test]
fn fresh_store_bootstraps_without_running_ledger() {
    let temp = TempDir::new().unwrap();
    let ledger = MigrationLedger::new(vec![failing_step(2)]).unwrap();
    let opened = lifecycle(ledger, 3).open(&store_config(&temp), &secret()).unwrap();
    assert_eq!(
        opened.outcome,
        OpenOutcome::Bootstrapped {
            version: SchemaVersion::new(3),
        }
    );
    assert_eq!(opened.handle.schema_version().unwrap(), SchemaVersion::new(3));
    assert!(opened.handle.table_exists("journal").unwrap());
    assert!(marker_tables(opened.handle.connection()).is_empty());
}

#[test]
fn stamped_store_upgrades_without_bootstrap() {
    let temp = TempDir::new().unwrap();
    create_store_at(&temp, 1);

    let definition = journal_schema().table(
        "never_created",
        "CREATE TABLE never_created (_id INTEGER PRIMARY KEY)",
    );
    let lifecycle =
        StoreLifecycle::new(definition, marker_ledger(&[2, 3]), SchemaVersion::new(3)).unwrap();
    let opened = lifecycle.open(&store_config(&temp), &secret()).unwrap();

    let report = match &opened.outcome {
        OpenOutcome::Upgraded(report) => report.clone(),
        other => panic!("expected upgrade, got {other:?}"),
    };
    assert_eq!(report.from, SchemaVersion::new(1));
    assert_eq!(report.to, SchemaVersion::new(3));
    assert_eq!(report.applied, [SchemaVersion::new(2), SchemaVersion::new(3)]);
    assert!(!opened.handle.table_exists("never_created").unwrap());
    assert_eq!(marker_tables(opened.handle.connection()), ["marker_2", "marker_3"]);
    assert_eq!(opened.handle.schema_version().unwrap(), SchemaVersion::new(3));
}

#[test]
fn upgrade_skips_steps_at_or_below_stored_version() {
    let temp = TempDir::new().unwrap();
    create_store_at(&temp, 4);
    let opened = lifecycle(marker_ledger(&[2, 4, 6, 8]), 8)
        .open(&store_config(&temp), &secret())
        .unwrap();
    assert_eq!(marker_tables(opened.handle.connection()), ["marker_6", "marker_8"]);
}

#[test]
fn reopening_current_store_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let lifecycle = lifecycle(marker_ledger(&[2]), 2);
    let first = lifecycle.open(&store_config(&temp), &secret()).unwrap();
    let before = SchemaSnapshot::capture(first.handle.connection()).unwrap();
    drop(first);

    let second = lifecycle.open(&store_config(&temp), &secret()).unwrap();
    assert_eq!(
        second.outcome,
        OpenOutcome::Current {
            version: SchemaVersion::new(2),
        }
    );
    assert_eq!(SchemaSnapshot::capture(second.handle.connection()).unwrap(), before);
}

#[test]
fn store_newer_than_build_is_opened_unchanged() {
    let temp = TempDir::new().unwrap();
    create_store_at(&temp, 5);
    let opened = lifecycle(marker_ledger(&[2, 3]), 3).open(&store_config(&temp), &secret()).unwrap();
    assert_eq!(
        opened.outcome,
        OpenOutcome::AheadOfBuild {
            stored: SchemaVersion::new(5),
            expected: SchemaVersion::new(3),
        }
    );
    assert_eq!(opened.handle.schema_version().unwrap(), SchemaVersion::new(5));
    assert!(marker_tables(opened.handle.connection()).is_empty());
}

// ============================================================================
// SECTION: Coordinator Idempotence
// ============================================================================

#[test]
fn upgrade_to_same_version_twice_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    create_store_at(&temp, 3);
    let mut handle = StoreHandle::open(&store_config(&temp), &secret()).unwrap();
    let ledger = marker_ledger(&[1, 2, 3, 4]);
    let before = SchemaSnapshot::capture(handle.connection()).unwrap();
    let version = SchemaVersion::new(3);

    for _ in 0 .. 2 {
        let report = upgrade(handle.connection_mut(), &ledger, version, version).unwrap();
        assert!(report.is_noop());
        assert_eq!(SchemaSnapshot::capture(handle.connection()).unwrap(), before);
    }
}

#[test]
fn upgrade_backwards_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    create_store_at(&temp, 3);
    let mut handle = StoreHandle::open(&store_config(&temp), &secret()).unwrap();
    let report =
        upgrade(handle.connection_mut(), &marker_ledger(&[1, 2, 3]), SchemaVersion::new(3), SchemaVersion::new(1))
            .unwrap();
    assert!(report.is_noop());
    assert_eq!(handle.schema_version().unwrap(), SchemaVersion::new(3));
}

#[test]
fn upgrade_rejects_stale_starting_version() {
    let temp = TempDir::new().unwrap();
    create_store_at(&temp, 2);
    let mut handle = StoreHandle::open(&store_config(&temp), &secret()).unwrap();
    let ledger = MigrationLedger::new(vec![marker_step(2), marker_step(3)]).unwrap();
    let result = upgrade(handle.connection_mut(), &ledger, SchemaVersion::new(1), SchemaVersion::new(3));
    assert!(matches!(result, Err(StoreError::Invalid(_))), "unexpected result: {result:?}");
    assert_eq!(handle.schema_version().unwrap(), SchemaVersion::new(2));
    assert!(marker_tables(handle.connection()).is_empty());
}
