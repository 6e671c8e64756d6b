// crates/sealstore/src/lib.rs
// ============================================================================
// Module: Sealstore
// Description: Encrypted SQLite store with a versioned schema lifecycle.
// Purpose: Open, bootstrap, and upgrade the application store atomically.
// Dependencies: hex, rusqlite (SQLCipher), serde, serde_json, thiserror, toml, tracing
// ============================================================================

//! ## Overview
//! This crate opens the application's single encrypted store file, keys it
//! with a caller-owned secret, and brings its schema to the version expected
//! by the running build. A fresh file is bootstrapped directly to the current
//! schema; an existing file is moved forward through an append-only ledger of
//! migration steps inside one transaction, so an upgrade either lands
//! completely or leaves the store at its previous version.
//!
//! The concrete application schema and its historical ledger live in
//! [`catalog`]; the lifecycle machinery is schema-agnostic and accepts any
//! [`SchemaDefinition`] and [`MigrationLedger`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod handle;
pub mod ledger;
pub mod lifecycle;
pub mod purge;
pub mod secret;
pub mod snapshot;
pub mod statement;
pub mod version;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bootstrap::SchemaDefinition;
pub use bootstrap::TableOwner;
pub use bootstrap::bootstrap;
pub use config::ConfigError;
pub use config::SealstoreConfig;
pub use config::SqliteSyncMode;
pub use config::StoreConfig;
pub use coordinator::UpgradeReport;
pub use coordinator::upgrade;
pub use error::StoreError;
pub use handle::CIPHER_KDF_ITERATIONS;
pub use handle::CIPHER_PAGE_SIZE;
pub use handle::StoreHandle;
pub use ledger::CustomAction;
pub use ledger::MigrationAction;
pub use ledger::MigrationLedger;
pub use ledger::MigrationStep;
pub use lifecycle::OpenOutcome;
pub use lifecycle::OpenedStore;
pub use lifecycle::StoreLifecycle;
pub use purge::PurgeSpec;
pub use purge::purge;
pub use secret::StoreSecret;
pub use snapshot::SchemaSnapshot;
pub use statement::StatementBatch;
pub use version::SchemaVersion;
