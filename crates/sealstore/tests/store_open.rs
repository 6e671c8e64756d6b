// crates/sealstore/tests/store_open.rs
// ============================================================================
// Module: Store Open Tests
// Description: Keying, engine settings, and failure classification on open.
// Purpose: Validate the fixed open sequence against real store files.
// ============================================================================

//! ## Overview
//! Opens encrypted store files in temp directories and checks:
//! - WAL and the page-cache budget are active after open
//! - a wrong secret fails as a key-derivation error
//! - filesystem failures and unusable paths are classified

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

use sealstore::SchemaVersion;
use sealstore::StoreConfig;
use sealstore::StoreError;
use sealstore::StoreHandle;
use sealstore::config::DEFAULT_CACHE_SIZE_PAGES;
use tempfile::TempDir;

mod common;
use crate::common::other_secret;
use crate::common::secret;
use crate::common::store_config;

// ============================================================================
// SECTION: Engine Settings
// ============================================================================

#[test]
fn open_enables_wal_and_default_cache_budget() {
    let temp = TempDir::new().unwrap();
    let handle = StoreHandle::open(&store_config(&temp), &secret()).unwrap();
    assert_eq!(handle.journal_mode().unwrap(), "wal");
    assert_eq!(handle.cache_size().unwrap(), i64::from(DEFAULT_CACHE_SIZE_PAGES));
    assert!(handle.path().ends_with("messenger.db"));
}

#[test]
fn open_applies_configured_cache_budget() {
    let temp = TempDir::new().unwrap();
    let mut config = store_config(&temp);
    config.cache_size_pages = 2_000;
    let handle = StoreHandle::open(&config, &secret()).unwrap();
    assert_eq!(handle.cache_size().unwrap(), 2_000);
}

#[test]
fn open_creates_missing_parent_directories() {
    let temp = TempDir::new().unwrap();
    let config = StoreConfig::new(temp.path().join("a").join("b").join("store.db"));
    let handle = StoreHandle::open(&config, &secret()).unwrap();
    assert_eq!(handle.schema_version().unwrap(), SchemaVersion::UNSTAMPED);
}

// ============================================================================
// SECTION: Keying
// ============================================================================

#[test]
fn reopen_with_same_secret_reads_data() {
    let temp = TempDir::new().unwrap();
    let config = store_config(&temp);
    {
        let handle = StoreHandle::open(&config, &secret()).unwrap();
        handle
            .connection()
            .execute_batch(
                "CREATE TABLE note (_id INTEGER PRIMARY KEY, body TEXT);
                 INSERT INTO note (body) VALUES ('kept');",
            )
            .unwrap();
    }
    let handle = StoreHandle::open(&config, &secret()).unwrap();
    let body: String =
        handle.connection().query_row("SELECT body FROM note", [], |row| row.get(0)).unwrap();
    assert_eq!(body, "kept");
    assert!(handle.table_exists("note").unwrap());
    assert!(handle.column_exists("note", "body").unwrap());
    assert!(!handle.column_exists("note", "missing").unwrap());
    assert!(!handle.column_exists("absent_table", "body").unwrap());
}

#[test]
fn wrong_secret_is_a_key_derivation_error() {
    let temp = TempDir::new().unwrap();
    let config = store_config(&temp);
    {
        let handle = StoreHandle::open(&config, &secret()).unwrap();
        handle.connection().execute_batch("CREATE TABLE note (_id INTEGER PRIMARY KEY)").unwrap();
    }
    let Err(err) = StoreHandle::open(&config, &other_secret()) else {
        panic!("expected wrong secret to fail");
    };
    assert!(matches!(err, StoreError::KeyDerivation(_)), "unexpected error: {err:?}");
}

#[test]
fn plaintext_file_is_a_key_derivation_error() {
    let temp = TempDir::new().unwrap();
    let config = store_config(&temp);
    std::fs::create_dir_all(config.path.parent().unwrap()).unwrap();
    std::fs::write(&config.path, vec![0x42_u8; 8_192]).unwrap();
    let Err(err) = StoreHandle::open(&config, &secret()) else {
        panic!("expected garbage file to fail");
    };
    assert!(matches!(err, StoreError::KeyDerivation(_)), "unexpected error: {err:?}");
}

// ============================================================================
// SECTION: Path Failures
// ============================================================================

#[test]
fn parent_that_is_a_file_is_an_io_error() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let config = StoreConfig::new(blocker.join("store.db"));
    let Err(err) = StoreHandle::open(&config, &secret()) else {
        panic!("expected io failure");
    };
    assert!(matches!(err, StoreError::Io(_)), "unexpected error: {err:?}");
}

#[test]
fn directory_path_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = StoreConfig::new(temp.path().to_path_buf());
    let Err(err) = StoreHandle::open(&config, &secret()) else {
        panic!("expected directory path to fail");
    };
    assert!(matches!(err, StoreError::Invalid(_)));
}

#[test]
fn zero_cache_budget_is_rejected() {
    let temp = TempDir::new().unwrap();
    let mut config = store_config(&temp);
    config.cache_size_pages = 0;
    assert!(matches!(StoreHandle::open(&config, &secret()), Err(StoreError::Invalid(_))));
}
