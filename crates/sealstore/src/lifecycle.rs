// crates/sealstore/src/lifecycle.rs
// ============================================================================
// Module: Store Lifecycle
// Description: Open sequence tying the handle, bootstrapper and coordinator.
// Purpose: Return a handle whose schema matches the running build.
// Dependencies: rusqlite, serde, tracing
// ============================================================================

//! ## Overview
//! [`StoreLifecycle::open`] keys the store file, reads its version stamp and
//! then takes exactly one path:
//! - unstamped: bootstrap the full current schema and stamp it, in one
//!   transaction;
//! - behind the build: run the ledger range through [`upgrade`];
//! - equal to the build: nothing;
//! - ahead of the build: nothing, logged at `warn` (stamps never decrease).
//!
//! The caller receives no handle until the chosen path has committed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use rusqlite::TransactionBehavior;
use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::bootstrap::SchemaDefinition;
use crate::bootstrap::bootstrap;
use crate::config::StoreConfig;
use crate::coordinator::UpgradeReport;
use crate::coordinator::upgrade;
use crate::error::StoreError;
use crate::handle::StoreHandle;
use crate::ledger::MigrationLedger;
use crate::secret::StoreSecret;
use crate::version::SchemaVersion;
use crate::version::read_version_stamp;
use crate::version::write_version_stamp;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// What the open sequence did to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OpenOutcome {
    /// A fresh file received the full current schema.
    Bootstrapped {
        /// Version written to the new file.
        version: SchemaVersion,
    },
    /// An older store was moved forward.
    Upgraded(UpgradeReport),
    /// The store already matched the build.
    Current {
        /// Stored version.
        version: SchemaVersion,
    },
    /// The store was written by a newer build and was left untouched.
    AheadOfBuild {
        /// Stored version.
        stored: SchemaVersion,
        /// Version expected by this build.
        expected: SchemaVersion,
    },
}

/// Handle returned by [`StoreLifecycle::open`] with its outcome.
#[derive(Debug)]
pub struct OpenedStore {
    /// Ready-to-use store handle.
    pub handle: StoreHandle,
    /// What the open sequence did.
    pub outcome: OpenOutcome,
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Current schema, historical ledger, and the version this build expects.
#[derive(Debug, Clone)]
pub struct StoreLifecycle {
    /// Full current schema for fresh files.
    definition: SchemaDefinition,
    /// Historical migration steps.
    ledger: MigrationLedger,
    /// Version produced by `definition` and reached by `ledger`.
    current_version: SchemaVersion,
}

impl StoreLifecycle {
    /// Builds a lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when `current_version` is zero or lower
    /// than the ledger's latest threshold.
    pub fn new(
        definition: SchemaDefinition,
        ledger: MigrationLedger,
        current_version: SchemaVersion,
    ) -> Result<Self, StoreError> {
        if current_version.is_unstamped() {
            return Err(StoreError::Invalid("current version must be greater than zero".to_string()));
        }
        let latest = ledger.latest_version().unwrap_or(SchemaVersion::UNSTAMPED);
        if latest > current_version {
            return Err(StoreError::Invalid(format!(
                "ledger reaches version {latest} beyond current version {current_version}"
            )));
        }
        Ok(Self {
            definition,
            ledger,
            current_version,
        })
    }

    /// Returns the version this build expects.
    #[must_use]
    pub const fn current_version(&self) -> SchemaVersion {
        self.current_version
    }

    /// Returns the historical ledger.
    #[must_use]
    pub const fn ledger(&self) -> &MigrationLedger {
        &self.ledger
    }

    /// Returns the current schema definition.
    #[must_use]
    pub const fn definition(&self) -> &SchemaDefinition {
        &self.definition
    }

    /// Opens the store and brings its schema to the current version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KeyDerivation`] or [`StoreError::Io`] from the
    /// open sequence, and [`StoreError::Migration`] when an upgrade step
    /// fails (the store is left at its previous version).
    pub fn open(&self, config: &StoreConfig, secret: &StoreSecret) -> Result<OpenedStore, StoreError> {
        let mut handle = StoreHandle::open(config, secret)?;
        let outcome = self.synchronize(handle.connection_mut())?;
        Ok(OpenedStore {
            handle,
            outcome,
        })
    }

    /// Bootstraps or upgrades an already keyed connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the bootstrap or upgrade fails.
    pub fn synchronize(&self, connection: &mut Connection) -> Result<OpenOutcome, StoreError> {
        let stored = read_version_stamp(connection)?;
        if stored.is_unstamped() {
            return self.bootstrap_fresh(connection);
        }
        if stored > self.current_version {
            warn!(
                %stored,
                expected = %self.current_version,
                "store is newer than this build; opening without changes"
            );
            return Ok(OpenOutcome::AheadOfBuild {
                stored,
                expected: self.current_version,
            });
        }
        if stored == self.current_version {
            return Ok(OpenOutcome::Current {
                version: stored,
            });
        }
        upgrade(connection, &self.ledger, stored, self.current_version).map(OpenOutcome::Upgraded)
    }

    /// Creates the current schema and stamps it in one transaction.
    fn bootstrap_fresh(&self, connection: &mut Connection) -> Result<OpenOutcome, StoreError> {
        let version = self.current_version;
        info!(%version, owners = self.definition.owners().len(), "bootstrapping fresh store");
        let tx = connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| StoreError::from_sqlite(&err))?;
        let stored = read_version_stamp(&tx)?;
        if !stored.is_unstamped() {
            return Err(StoreError::Invalid(format!(
                "store was stamped at version {stored} while bootstrapping"
            )));
        }
        bootstrap(&tx, &self.definition)?;
        write_version_stamp(&tx, version)?;
        tx.commit().map_err(|err| StoreError::from_sqlite(&err))?;
        info!(%version, "store bootstrapped");
        Ok(OpenOutcome::Bootstrapped {
            version,
        })
    }
}
