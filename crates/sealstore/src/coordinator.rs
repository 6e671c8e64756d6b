// crates/sealstore/src/coordinator.rs
// ============================================================================
// Module: Upgrade Coordinator
// Description: Runs selected migration steps in one atomic transaction.
// Purpose: Move a store between versions all-or-nothing.
// Dependencies: rusqlite, serde, tracing
// ============================================================================

//! ## Overview
//! [`upgrade`] fetches the ledger steps for `old → new`, opens a single
//! `IMMEDIATE` transaction, and runs every action of every step through one
//! interpreter. The version stamp is written as the last statement of that
//! transaction, so it moves only when every step succeeded and the commit
//! landed. Any failure drops the transaction, which rolls back every prior
//! step, and is reported as [`StoreError::Migration`] naming the failing
//! threshold. Retrying the same upgrade re-attempts the same step.
//!
//! Steps commonly depend on earlier ones (a later step assumes an earlier
//! column exists), and there is no per-step checkpoint to resume from, so the
//! transaction always spans the whole call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use rusqlite::Connection;
use rusqlite::TransactionBehavior;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::error::StoreError;
use crate::ledger::MigrationAction;
use crate::ledger::MigrationLedger;
use crate::ledger::MigrationStep;
use crate::purge::purge;
use crate::version::SchemaVersion;
use crate::version::read_version_stamp;
use crate::version::write_version_stamp;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Summary of a completed upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeReport {
    /// Version before the upgrade.
    pub from: SchemaVersion,
    /// Version after the upgrade.
    pub to: SchemaVersion,
    /// Thresholds of the steps that ran, ascending.
    pub applied: Vec<SchemaVersion>,
    /// Work-item rows removed by purge actions.
    pub rows_purged: usize,
}

impl UpgradeReport {
    /// Returns a report for an upgrade that had nothing to do.
    #[must_use]
    pub const fn unchanged(version: SchemaVersion) -> Self {
        Self {
            from: version,
            to: version,
            applied: Vec::new(),
            rows_purged: 0,
        }
    }

    /// Returns true when no step ran.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.from == self.to
    }
}

// ============================================================================
// SECTION: Upgrade
// ============================================================================

/// Upgrades the store from `old` to `new` in one transaction.
///
/// When `old >= new` nothing runs and the stamp is left untouched. Otherwise
/// the stored stamp must equal `old` when the transaction begins.
///
/// # Errors
///
/// Returns [`StoreError::Migration`] when a step (or the final commit) fails;
/// the store is left at `old`. Returns [`StoreError::Invalid`] when the stored
/// stamp does not match `old`, and classified engine errors when the
/// transaction cannot be started.
pub fn upgrade(
    connection: &mut Connection,
    ledger: &MigrationLedger,
    old: SchemaVersion,
    new: SchemaVersion,
) -> Result<UpgradeReport, StoreError> {
    if old >= new {
        debug!(%old, %new, "no upgrade required");
        return Ok(UpgradeReport::unchanged(old));
    }
    let steps = ledger.steps_between(old, new);
    info!(%old, %new, steps = steps.len(), "upgrading store");
    let started = Instant::now();

    let tx = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|err| StoreError::from_sqlite(&err))?;
    let stored = read_version_stamp(&tx)?;
    if stored != old {
        return Err(StoreError::Invalid(format!(
            "store is at version {stored}, expected {old} before upgrading"
        )));
    }

    let mut report = UpgradeReport {
        from: old,
        to: new,
        applied: Vec::with_capacity(steps.len()),
        rows_purged: 0,
    };
    for step in steps {
        let purged =
            run_step(&tx, step).map_err(|err| StoreError::migration(step.threshold(), &err))?;
        report.rows_purged += purged;
        report.applied.push(step.threshold());
    }
    write_version_stamp(&tx, new).map_err(|err| StoreError::migration(new, &err))?;
    tx.commit().map_err(|err| StoreError::migration(new, &StoreError::from_sqlite(&err)))?;

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        %old,
        %new,
        applied = report.applied.len(),
        rows_purged = report.rows_purged,
        elapsed_ms,
        "store upgraded"
    );
    Ok(report)
}

/// Runs every action of one step; returns the rows purged.
fn run_step(connection: &Connection, step: &MigrationStep) -> Result<usize, StoreError> {
    debug!(threshold = %step.threshold(), description = step.description(), "applying step");
    let mut purged = 0;
    for action in step.actions() {
        match action {
            MigrationAction::Statements(batch) => batch.execute(connection)?,
            MigrationAction::Purge(spec) => purged += purge(connection, spec)?,
            MigrationAction::Custom(custom) => {
                debug!(action = custom.name(), "running custom action");
                custom.run(connection)?;
            }
        }
    }
    Ok(purged)
}
